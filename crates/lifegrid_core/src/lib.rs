//! # LIFEGRID Core Engine
//!
//! Conway's Game of Life (B3/S23) on a fixed, non-wrapping grid, with a
//! pre-allocated pool of renderable cell handles:
//! - 192x108 grid by default, evaluated every tick
//! - Zero handle allocation while the population fits the pool
//! - Graceful overflow when it does not
//!
//! ## Architecture Rules
//!
//! 1. **Pool owns, grid borrows** - the grid stores `CellId`s, never handles
//! 2. **Double-buffered generations** - the next bitmap is its own allocation
//! 3. **No scheduling inside** - drivers call `tick()`, the engine never waits
//!
//! ## Example
//!
//! ```rust,ignore
//! use lifegrid_core::{LifeConfig, LifeEngine, NullView};
//!
//! let mut engine = LifeEngine::from_config(&LifeConfig::default(), NullView)?;
//! let report = engine.tick();
//! assert_eq!(report.generation, 1);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod memory;
pub mod patterns;
pub mod rules;
pub mod view;

pub use config::{LifeConfig, SeedParams};
pub use engine::{LifeEngine, TickReport};
pub use error::{LifeError, LifeResult};
pub use grid::LifeGrid;
pub use memory::{CellHandle, CellId, CellPool, PoolStats};
pub use patterns::Pattern;
pub use view::{CellPosition, CellView, LedgerView, NullView, ViewCell};
