//! Tourism statistics for the world map front end.
//!
//! Every request reloads the UN Tourism CSVs and runs the same pipeline:
//! load, resolve one indicator per reporter, normalize units, map area
//! names to ISO-3, then derive the metric.
pub mod breakdown;
pub mod config;
pub mod countries;
pub mod error;
pub mod loader;
pub mod monthly;
pub mod output;
pub mod reports;
pub mod resolver;
pub mod routes;
pub mod types;
pub mod units;
pub mod util;

pub use error::{ReportError, Result};
