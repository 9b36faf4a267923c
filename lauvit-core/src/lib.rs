pub mod body;
pub mod config;
pub mod db;
pub mod error;
pub mod exercise;
pub mod ids;
pub mod logging;
pub mod plan;
pub mod records;
pub mod stats;
pub mod workout;

pub use error::{LauvitError, Result};
