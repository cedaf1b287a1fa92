//! # Memory Management
//!
//! Pre-allocated cell handles for zero-allocation ticks.
//!
//! ## Design Philosophy
//!
//! All handles are placed once at startup. During a tick:
//! - No handle is created while the population fits the pool
//! - No handle is ever destroyed
//! - Exhaustion degrades to overflow handles, never to a failed tick

mod pool;

pub use pool::{CellHandle, CellId, CellPool, PoolStats};
