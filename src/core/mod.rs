//! Core data structures: month keys, partially observed series, price
//! tables and the administrative hierarchy.

mod hierarchy;
mod month;
pub mod series;
mod table;

pub use hierarchy::{AdminLevel, Hierarchy};
pub use month::YearMonth;
pub use table::{PriceRow, PriceTable};
