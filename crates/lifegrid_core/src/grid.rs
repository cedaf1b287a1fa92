//! # Life Grid
//!
//! Flat, fixed-size array of optional cell handles, indexed `y * width + x`.
//!
//! A slot holding a [`CellId`] is alive. The grid never owns the handle; it
//! only remembers which pooled handle renders that position.

use crate::error::{LifeError, LifeResult};
use crate::memory::CellId;

/// Relative offsets of the Moore neighborhood.
const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Largest number of cells a grid may hold (handle ids are 32-bit).
pub const MAX_CELLS: usize = u32::MAX as usize;

/// The live grid of one simulation session.
#[derive(Clone, Debug)]
pub struct LifeGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<CellId>>,
}

impl LifeGrid {
    /// Creates an all-dead grid.
    ///
    /// Zero dimensions are allowed and give an empty grid.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidDimensions`] if `width * height` exceeds
    /// [`MAX_CELLS`].
    pub fn new(width: usize, height: usize) -> LifeResult<Self> {
        let len = width
            .checked_mul(height)
            .filter(|&len| len <= MAX_CELLS)
            .ok_or(LifeError::InvalidDimensions { width, height })?;

        Ok(Self {
            width,
            height,
            cells: vec![None; len],
        })
    }

    /// Number of columns.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of positions.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the grid has no positions at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flat index of `(x, y)`, if in bounds.
    #[inline]
    #[must_use]
    pub const fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// Handle rendering `(x, y)`, if the cell is alive.
    #[inline]
    #[must_use]
    pub fn handle_at(&self, x: usize, y: usize) -> Option<CellId> {
        self.index(x, y).and_then(|index| self.cells[index])
    }

    /// Whether `(x, y)` is alive. Out-of-bounds positions are dead.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, x: usize, y: usize) -> bool {
        self.handle_at(x, y).is_some()
    }

    /// Live cells among the in-bounds Moore neighbors of `(x, y)`.
    ///
    /// Edges do not wrap.
    #[must_use]
    pub fn live_neighbors(&self, x: usize, y: usize) -> u8 {
        let mut count = 0;
        for (dx, dy) in NEIGHBOR_OFFSETS {
            let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                continue;
            };
            if self.is_alive(nx, ny) {
                count += 1;
            }
        }
        count
    }

    /// Number of live positions.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.cells.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterates over live cells as `(x, y, handle)`.
    pub fn iter_live(&self) -> impl Iterator<Item = (usize, usize, CellId)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| slot.map(|id| (index % width, index / width, id)))
    }

    #[inline]
    pub(crate) fn slot(&self, index: usize) -> Option<CellId> {
        self.cells[index]
    }

    #[inline]
    pub(crate) fn set_slot(&mut self, index: usize, slot: Option<CellId>) {
        self.cells[index] = slot;
    }
}
