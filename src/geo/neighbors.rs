//! Static nearest-neighbor graph between locations.

use crate::geo::coordinates::{haversine_km, CoordinateTable};
use std::collections::HashMap;
use tracing::debug;

/// Location → nearest other locations, nearest first.
#[derive(Debug, Clone, Default)]
pub struct NeighborGraph {
    neighbors: HashMap<String, Vec<String>>,
}

impl NeighborGraph {
    /// Resolve the `n` nearest known locations for each requested one.
    ///
    /// Distances are great-circle distances. Equal distances keep the
    /// table's natural order. Requested locations missing from the table get
    /// an empty list.
    pub fn nearest<S: AsRef<str>>(table: &CoordinateTable, requested: &[S], n: usize) -> Self {
        let mut neighbors = HashMap::with_capacity(requested.len());

        for name in requested {
            let name = name.as_ref();
            let nearest = match table.get(name) {
                Some(origin) => {
                    let mut distances: Vec<(&str, f64)> = table
                        .iter()
                        .filter(|(other, _)| *other != name)
                        .map(|(other, coord)| (other, haversine_km(origin, coord)))
                        .collect();
                    // stable: ties stay in table order
                    distances.sort_by(|a, b| a.1.total_cmp(&b.1));
                    distances
                        .into_iter()
                        .take(n)
                        .map(|(other, _)| other.to_string())
                        .collect()
                }
                None => {
                    debug!(location = name, "no coordinates; location gets no neighbors");
                    Vec::new()
                }
            };
            neighbors.insert(name.to_string(), nearest);
        }

        Self { neighbors }
    }

    /// Build from explicit lists.
    pub fn from_lists<I, S, N>(lists: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<N>)>,
        S: Into<String>,
        N: Into<String>,
    {
        let neighbors = lists
            .into_iter()
            .map(|(name, list)| {
                let name = name.into();
                let list = list
                    .into_iter()
                    .map(Into::into)
                    .filter(|n: &String| *n != name)
                    .collect();
                (name, list)
            })
            .collect();
        Self { neighbors }
    }

    /// Neighbors of `location`; empty for unknown locations.
    pub fn neighbors(&self, location: &str) -> &[String] {
        self.neighbors
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}
