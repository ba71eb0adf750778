//! Shared types for callstats: the error enum, the record and result model,
//! label formatting and command-line settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;

pub use error::{CallStatsError, Result};
