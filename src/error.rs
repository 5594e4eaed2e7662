//! Error taxonomy for the whole crate.
//!
//! Hard failures are always returned as [`Error`]; soft failures (a selector
//! that matches nothing on one axis) only log a warning and produce an
//! empty/NaN-filled result, because multi-axis queries are typically run
//! interactively.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The requested axis name is absent from the signal.
    #[error("axis '{0}' not found in the data")]
    AxisNotFound(String),

    /// Trial index past the number of stored trials.
    #[error("trial {trial} out of range (data holds {n_trials} trials)")]
    TrialOutOfRange { trial: usize, n_trials: usize },

    /// Coordinate array length disagrees with the data dimension it labels.
    #[error("axis '{axis}' has {axis_len} values but the data dimension holds {dim_len}")]
    ShapeMismatch {
        axis: String,
        axis_len: usize,
        dim_len: usize,
    },

    /// Paired begin/end sample lists of different lengths.
    #[error("begsam has {n_beg} entries but endsam has {n_end}")]
    MismatchedBounds { n_beg: usize, n_end: usize },

    /// The operation needs "time" as the last axis.
    #[error("'time' must be the last axis for this operation")]
    TimeAxisNotLast,

    /// The operation needs numeric coordinates but the axis is categorical.
    #[error("axis '{0}' holds labels, not numeric values")]
    NotNumericAxis(String),

    /// Epoch-averaged spectra cannot retain complex output.
    #[error("complex output cannot be averaged across epochs; drop 'duration'")]
    ComplexAverage,

    /// Resampling ratio is not a downsampling integer.
    #[error("cannot resample from {orig} Hz to {target} Hz: ratio must be an integer > 1")]
    NonIntegerRatio { orig: f64, target: f64 },

    /// An unrecognized name at a string boundary (CLI, config, file header).
    #[error("unknown {kind} '{name}'")]
    UnknownName { kind: &'static str, name: String },

    /// Catch-all for invalid parameter combinations.
    #[error("{0}")]
    InvalidArgument(String),

    /// I/O failure while persisting or loading a signal.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A saved signal file that cannot be decoded.
    #[error("malformed signal file: {0}")]
    Malformed(String),
}
