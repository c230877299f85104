// src/error.rs
use thiserror::Error;

/// Caller mistakes the analytics core refuses to paper over.
///
/// Malformed data is never an error (it degrades to zero/empty results);
/// only structural misuse, like asking for a column the data does not have,
/// ends up here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("unknown field '{field}' requested for {purpose}")]
    UnknownField { field: String, purpose: &'static str },
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;
