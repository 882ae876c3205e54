//! Error types for calpoint operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid format pattern: {0}")]
    InvalidPattern(String),
}

pub type Result<T> = std::result::Result<T, CalendarError>;
