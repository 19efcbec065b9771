pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod tracker;

pub use config::DatabaseConfig;
pub use error::{FitlogError, Result};
pub use tracker::Tracker;
