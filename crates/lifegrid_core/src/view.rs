//! # Cell View Capability
//!
//! The rendering side of a pooled cell handle.
//!
//! The pool never draws anything itself. It drives a [`CellView`] whenever a
//! handle is created, repositioned, activated or toggled, and the host decides
//! what that means (sprites, terminal glyphs, nothing at all).

/// World-space position of a cell handle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellPosition {
    /// Horizontal coordinate.
    pub x: f32,
    /// Vertical coordinate.
    pub y: f32,
}

impl CellPosition {
    /// Creates a position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Grid-origin world position of the cell at column `x`, row `y`.
    ///
    /// Centering on screen is the host's concern.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_grid(x: usize, y: usize, cell_size: f32) -> Self {
        Self {
            x: x as f32 * cell_size,
            y: y as f32 * cell_size,
        }
    }
}

/// Host-side operations the pool performs on renderable cells.
pub trait CellView {
    /// The host's handle for one renderable cell.
    type Handle;

    /// Creates a renderable cell at `position`.
    fn place(&mut self, position: CellPosition) -> Self::Handle;

    /// Shows the cell as alive or dead.
    fn set_visual_alive(&mut self, handle: &Self::Handle, alive: bool);

    /// Shows or hides the cell entirely.
    fn set_active(&mut self, handle: &Self::Handle, active: bool);

    /// Moves the cell.
    fn set_position(&mut self, handle: &Self::Handle, position: CellPosition);
}

/// A view that renders nothing.
///
/// Used by headless hosts and benchmarks.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullView;

impl CellView for NullView {
    type Handle = ();

    #[inline]
    fn place(&mut self, _position: CellPosition) {}

    #[inline]
    fn set_visual_alive(&mut self, _handle: &(), _alive: bool) {}

    #[inline]
    fn set_active(&mut self, _handle: &(), _active: bool) {}

    #[inline]
    fn set_position(&mut self, _handle: &(), _position: CellPosition) {}
}

/// Visual state of one cell as last set through a [`LedgerView`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewCell {
    /// Last position set.
    pub position: CellPosition,
    /// Last alive color set.
    pub alive: bool,
    /// Whether the cell is shown.
    pub active: bool,
}

/// A view that keeps the visual state of every placed cell in memory.
///
/// Hosts that render in batches read [`LedgerView::cells`] once per frame.
#[derive(Clone, Debug, Default)]
pub struct LedgerView {
    cells: Vec<ViewCell>,
    placements: usize,
}

impl LedgerView {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All cells ever placed, indexed by view handle.
    #[must_use]
    pub fn cells(&self) -> &[ViewCell] {
        &self.cells
    }

    /// Number of `place` calls received.
    #[must_use]
    pub const fn placements(&self) -> usize {
        self.placements
    }

    /// Number of cells currently shown.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.active).count()
    }
}

impl CellView for LedgerView {
    type Handle = usize;

    fn place(&mut self, position: CellPosition) -> usize {
        self.placements += 1;
        self.cells.push(ViewCell {
            position,
            alive: false,
            active: false,
        });
        self.cells.len() - 1
    }

    fn set_visual_alive(&mut self, handle: &usize, alive: bool) {
        if let Some(cell) = self.cells.get_mut(*handle) {
            cell.alive = alive;
        }
    }

    fn set_active(&mut self, handle: &usize, active: bool) {
        if let Some(cell) = self.cells.get_mut(*handle) {
            cell.active = active;
        }
    }

    fn set_position(&mut self, handle: &usize, position: CellPosition) {
        if let Some(cell) = self.cells.get_mut(*handle) {
            cell.position = position;
        }
    }
}
