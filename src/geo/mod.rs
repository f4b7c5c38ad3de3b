//! Geographic lookups: coordinates, great-circle distance and the static
//! nearest-neighbor graph consumed by the geographic imputer.

mod coordinates;
mod neighbors;

pub use coordinates::{haversine_km, Coordinate, CoordinateTable, EARTH_RADIUS_KM};
pub use neighbors::NeighborGraph;
