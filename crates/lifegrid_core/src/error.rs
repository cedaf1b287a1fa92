//! # Engine Error Types
//!
//! All errors that can occur while configuring or driving a simulation.
//!
//! Pool exhaustion and invalid releases are deliberately absent: both are
//! handled inside the pool and never surface as errors to the tick loop.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the simulation engine.
#[derive(Error, Debug)]
pub enum LifeError {
    /// Grid dimensions are zero or their product overflows.
    #[error("invalid grid dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// The pool must hold at least one handle.
    #[error("pool size must be positive")]
    InvalidPoolSize,

    /// Tick interval is not a positive, representable number of seconds.
    #[error("invalid tick interval: {0}s (must be positive and finite)")]
    InvalidTickInterval(f64),

    /// Cell size is not a positive finite number.
    #[error("invalid cell size: {0} (must be positive and finite)")]
    InvalidCellSize(f32),

    /// Seeding probability outside `[0, 1]`.
    #[error("invalid live probability: {0} (must be within [0, 1])")]
    InvalidProbability(f64),

    /// A coordinate fell outside the grid.
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
        /// Grid width.
        width: usize,
        /// Grid height.
        height: usize,
    },

    /// A pattern would extend past the grid edge at the requested origin.
    #[error("pattern '{pattern}' does not fit at ({x}, {y})")]
    PatternDoesNotFit {
        /// Pattern name.
        pattern: &'static str,
        /// Requested origin column.
        x: usize,
        /// Requested origin row.
        y: usize,
    },

    /// No pattern registered under this name.
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),

    /// Configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::LifeConfig`].
    #[error("invalid configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The driver's tick thread could not be started.
    #[error("failed to spawn tick thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// The driver thread is gone.
    #[error("simulation driver has stopped")]
    DriverStopped,
}

/// Result type for engine operations.
pub type LifeResult<T> = Result<T, LifeError>;
