//! Location coordinates and great-circle distance.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Latitude/longitude in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Haversine great-circle distance in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos() * b.latitude.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Governorate capitals used for region-level neighbor lookups.
const GOVERNORATES: [(&str, f64, f64); 12] = [
    ("Aleppo", 36.2021, 37.1343),
    ("Al-Hasakeh", 36.5, 40.7333),
    ("Ar-Raqqa", 35.947, 39.017),
    ("Damascus", 33.5138, 36.2765),
    ("Dar'a", 32.6163, 36.1),
    ("Deir-ez-Zor", 35.3315, 40.148),
    ("Hama", 35.1312, 36.7572),
    ("Homs", 34.7343, 36.7123),
    ("Idleb", 35.9318, 36.6317),
    ("Lattakia", 35.7837, 35.5),
    ("Quneitra", 33.2, 35.5),
    ("Rural Damascus", 33.6, 36.5),
];

/// Named coordinates in a fixed natural order.
#[derive(Debug, Clone, Default)]
pub struct CoordinateTable {
    entries: Vec<(String, Coordinate)>,
}

impl CoordinateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The twelve predefined governorate capitals.
    pub fn governorates() -> Self {
        GOVERNORATES
            .iter()
            .map(|&(name, lat, lon)| (name, Coordinate::new(lat, lon)))
            .collect()
    }

    /// Add or replace a location. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, coordinate: Coordinate) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = coordinate,
            None => self.entries.push((name, coordinate)),
        }
    }

    pub fn get(&self, name: &str) -> Option<Coordinate> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Coordinate)> {
        self.entries.iter().map(|(n, c)| (n.as_str(), *c))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Coordinate)> for CoordinateTable {
    fn from_iter<I: IntoIterator<Item = (S, Coordinate)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, coordinate) in iter {
            table.insert(name, coordinate);
        }
        table
    }
}
