//! Error types for the vitals_core library.
//!
//! Analysis failures (`InsufficientSignal`, `MissingAxis`, `MissingColumns`,
//! `UndefinedRatio`, `InvalidNumeric`) are ordinary variants so callers can
//! match on them and pick a presentation, e.g. an "insufficient data" banner.

use std::fmt;
use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Acceleration axis, used to report which input column is absent
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("accel_x"),
            Axis::Y => f.write_str("accel_y"),
            Axis::Z => f.write_str("accel_z"),
        }
    }
}

/// Core error type for vitals_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Fewer than two heartbeats detected, so BPM and HRV are undefined
    #[error("Insufficient signal: {peaks} beat(s) detected, at least 2 needed")]
    InsufficientSignal { peaks: usize },

    /// An acceleration axis is absent from the input
    #[error("Missing acceleration axis: {0}")]
    MissingAxis(Axis),

    /// The acceleration axes have different lengths
    #[error("Acceleration axes differ in length (x={x}, y={y}, z={z})")]
    AxisLengthMismatch { x: usize, y: usize, z: usize },

    /// Required columns are absent from an import batch
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// ACWR requested with an empty (or zero-mean) window
    #[error("Undefined workload ratio: acute window has {acute} load point(s), chronic window has {chronic}")]
    UndefinedRatio { acute: usize, chronic: usize },

    /// Non-finite or non-numeric value where a number is required
    #[error("Invalid numeric value for {field}: {value:?}")]
    InvalidNumeric { field: String, value: String },

    /// Timestamp cell that matches none of the accepted formats
    #[error("Invalid timestamp at row {row}: {value:?}")]
    InvalidTimestamp { row: usize, value: String },

    /// Answer key not defined for the questionnaire
    #[error("Unknown field {field:?} for questionnaire {questionnaire}")]
    UnknownField { questionnaire: String, field: String },

    /// Answer outside the range the questionnaire allows
    #[error("Value {value} for {field} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Generic error
    #[error("{0}")]
    Other(String),
}
