//! # Simulation Configuration
//!
//! Loaded once at startup (TOML file, CLI overrides on top) and changeable
//! only through a full restart.
//!
//! ```toml
//! width = 192
//! height = 108
//! cell_size = 0.1
//! pool_size = 5000
//! live_probability = 0.3
//! tick_interval_secs = 0.1
//! seed = 42
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LifeError, LifeResult};
use crate::grid::MAX_CELLS;

/// Default grid width.
pub const DEFAULT_WIDTH: usize = 192;
/// Default grid height.
pub const DEFAULT_HEIGHT: usize = 108;
/// Default world size of one cell.
pub const DEFAULT_CELL_SIZE: f32 = 0.1;
/// Default number of pre-allocated cell handles.
pub const DEFAULT_POOL_SIZE: usize = 5000;
/// Default seeding density.
pub const DEFAULT_LIVE_PROBABILITY: f64 = 0.3;
/// Default seconds between generations.
pub const DEFAULT_TICK_INTERVAL_SECS: f64 = 0.1;
/// Longest accepted interval between generations (one hour).
pub const MAX_TICK_INTERVAL_SECS: f64 = 3600.0;

/// Parameters that shape one session: grid size, cell size and seeding density.
///
/// These are what `restart` takes. Zero dimensions are accepted here and
/// produce an empty grid; [`LifeConfig::validate`] is stricter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeedParams {
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
    /// World size of one cell.
    pub cell_size: f32,
    /// Probability that a cell starts alive.
    pub live_probability: f64,
}

impl SeedParams {
    /// Validates cell size, probability and total cell count.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> LifeResult<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(LifeError::InvalidCellSize(self.cell_size));
        }
        if !(0.0..=1.0).contains(&self.live_probability) {
            return Err(LifeError::InvalidProbability(self.live_probability));
        }
        match self.width.checked_mul(self.height) {
            Some(len) if len <= MAX_CELLS => Ok(()),
            _ => Err(LifeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            }),
        }
    }
}

impl Default for SeedParams {
    fn default() -> Self {
        LifeConfig::default().seed_params()
    }
}

/// Full host configuration for a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LifeConfig {
    /// Grid columns.
    pub width: usize,
    /// Grid rows.
    pub height: usize,
    /// World size of one cell.
    pub cell_size: f32,
    /// Number of pre-allocated cell handles.
    pub pool_size: usize,
    /// Probability that a cell starts alive.
    pub live_probability: f64,
    /// Seconds between generations.
    pub tick_interval_secs: f64,
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            cell_size: DEFAULT_CELL_SIZE,
            pool_size: DEFAULT_POOL_SIZE,
            live_probability: DEFAULT_LIVE_PROBABILITY,
            tick_interval_secs: DEFAULT_TICK_INTERVAL_SECS,
            seed: None,
        }
    }
}

impl LifeConfig {
    /// Parses and validates a TOML document.
    ///
    /// Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::ConfigParse`] for malformed TOML or unknown keys,
    /// or the validation error for out-of-range values.
    pub fn from_toml_str(source: &str) -> LifeResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::ConfigIo`] if the file cannot be read, otherwise
    /// as [`LifeConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> LifeResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| LifeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Rejects any configuration the driver must not start with.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> LifeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LifeError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.pool_size == 0 || u32::try_from(self.pool_size).is_err() {
            return Err(LifeError::InvalidPoolSize);
        }
        self.tick_interval()?;
        self.seed_params().validate()
    }

    /// The session parameters of this configuration.
    #[must_use]
    pub const fn seed_params(&self) -> SeedParams {
        SeedParams {
            width: self.width,
            height: self.height,
            cell_size: self.cell_size,
            live_probability: self.live_probability,
        }
    }

    /// Time between generations.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidTickInterval`] unless the interval is
    /// positive and at most [`MAX_TICK_INTERVAL_SECS`].
    pub fn tick_interval(&self) -> LifeResult<Duration> {
        if self.tick_interval_secs > MAX_TICK_INTERVAL_SECS {
            return Err(LifeError::InvalidTickInterval(self.tick_interval_secs));
        }
        match Duration::try_from_secs_f64(self.tick_interval_secs) {
            Ok(interval) if !interval.is_zero() => Ok(interval),
            _ => Err(LifeError::InvalidTickInterval(self.tick_interval_secs)),
        }
    }
}
