//! Linear referencing for rail networks
//!
//! Builds point features (mileposts, access points) from survey CSV files,
//! keeps the chainage ranges of route geometries consistent with their
//! geodesic length, and answers nearest-point queries.

pub mod chainage;
pub mod config;
pub mod error;
pub mod input;
pub mod output;
pub mod proximity;
pub mod record;
pub mod util;

pub use self::error::{Error, Result};
