//! # B3/S23 Rule
//!
//! A dead cell with exactly three live neighbors is born; a live cell with
//! two or three live neighbors survives; everything else is dead next
//! generation.

/// Number of cells in a Moore neighborhood.
pub const MOORE_NEIGHBORS: u8 = 8;

/// Next state of a cell given its current state and live neighbor count.
#[inline]
#[must_use]
pub const fn next_state(alive: bool, live_neighbors: u8) -> bool {
    matches!((alive, live_neighbors), (true, 2 | 3) | (false, 3))
}
