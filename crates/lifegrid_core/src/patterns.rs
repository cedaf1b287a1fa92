//! # Pattern Fixtures
//!
//! Classic still lifes, oscillators and spaceships, stored as live-cell
//! offsets from the pattern's top-left corner.

use crate::error::{LifeError, LifeResult};

/// A named arrangement of live cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pattern {
    /// Lowercase name used for lookup.
    pub name: &'static str,
    /// Bounding box width.
    pub width: usize,
    /// Bounding box height.
    pub height: usize,
    /// Live cells as `(x, y)` offsets.
    pub cells: &'static [(usize, usize)],
}

/// 2x2 still life.
pub const BLOCK: Pattern = Pattern {
    name: "block",
    width: 2,
    height: 2,
    cells: &[(0, 0), (1, 0), (0, 1), (1, 1)],
};

/// Six-cell still life.
pub const BEEHIVE: Pattern = Pattern {
    name: "beehive",
    width: 4,
    height: 3,
    cells: &[(1, 0), (2, 0), (0, 1), (3, 1), (1, 2), (2, 2)],
};

/// Period-2 oscillator, horizontal phase.
pub const BLINKER: Pattern = Pattern {
    name: "blinker",
    width: 3,
    height: 1,
    cells: &[(0, 0), (1, 0), (2, 0)],
};

/// Period-2 oscillator.
pub const TOAD: Pattern = Pattern {
    name: "toad",
    width: 4,
    height: 2,
    cells: &[(1, 0), (2, 0), (3, 0), (0, 1), (1, 1), (2, 1)],
};

/// Period-2 oscillator made of two diagonal blocks.
pub const BEACON: Pattern = Pattern {
    name: "beacon",
    width: 4,
    height: 4,
    cells: &[(0, 0), (1, 0), (0, 1), (3, 2), (2, 3), (3, 3)],
};

/// Period-4 spaceship travelling down-right.
pub const GLIDER: Pattern = Pattern {
    name: "glider",
    width: 3,
    height: 3,
    cells: &[(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)],
};

/// Methuselah that stabilizes after 1103 generations on an unbounded plane.
pub const R_PENTOMINO: Pattern = Pattern {
    name: "r-pentomino",
    width: 3,
    height: 3,
    cells: &[(1, 0), (2, 0), (0, 1), (1, 1), (1, 2)],
};

/// Every built-in pattern.
pub const PATTERNS: &[Pattern] = &[BLOCK, BEEHIVE, BLINKER, TOAD, BEACON, GLIDER, R_PENTOMINO];

impl Pattern {
    /// Finds a built-in pattern by name, case-insensitively. `None` if unknown.
    #[must_use]
    pub fn lookup(name: &str) -> Option<&'static Pattern> {
        PATTERNS
            .iter()
            .find(|pattern| pattern.name.eq_ignore_ascii_case(name))
    }

    /// Finds a built-in pattern by name, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::UnknownPattern`] if no pattern has that name.
    pub fn find(name: &str) -> LifeResult<&'static Pattern> {
        Self::lookup(name).ok_or_else(|| LifeError::UnknownPattern(name.to_owned()))
    }

    /// Number of live cells.
    #[inline]
    #[must_use]
    pub const fn population(&self) -> usize {
        self.cells.len()
    }
}
