//! # Life Engine
//!
//! Owns one simulation session: the grid, the next-generation bitmap, the
//! cell pool and the counters.
//!
//! ## Tick
//!
//! ```text
//! ┌──────────────┐  count + rule   ┌──────────────┐
//! │  LifeGrid    │ ──────────────> │  next bitmap │   (read-only pass)
//! └──────┬───────┘                 └──────┬───────┘
//!        │            diff                │
//!        └──────────────┬─────────────────┘
//!                       ▼
//!   deaths: pool.release, then births: pool.acquire
//! ```
//!
//! The bitmap is a separate allocation, so no slot is written while its
//! neighbors are still being counted. `tick()` takes `&mut self` and runs to
//! completion; observers only ever see the counters of finished ticks.
//!
//! `tick()` never schedules itself. Drivers call it.

use rand::distributions::{Bernoulli, Distribution};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, trace};

use crate::config::{LifeConfig, SeedParams};
use crate::error::{LifeError, LifeResult};
use crate::grid::LifeGrid;
use crate::memory::{CellPool, PoolStats};
use crate::patterns::Pattern;
use crate::rules;
use crate::view::{CellPosition, CellView};

/// Outcome of one generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Generation reached by this tick.
    pub generation: u64,
    /// Live cells after the tick.
    pub population: usize,
    /// Cells that became alive.
    pub births: usize,
    /// Cells that died.
    pub deaths: usize,
    /// Whether any birth had to use an overflow handle.
    pub overflowed: bool,
}

/// A running Game of Life session.
///
/// Construction seeds the grid; the engine is never observable in an
/// uninitialized state.
pub struct LifeEngine<V: CellView, R: Rng = ChaCha8Rng> {
    grid: LifeGrid,
    /// Next-generation bitmap. Same length as the grid, separate allocation.
    next: Vec<bool>,
    pool: CellPool<V>,
    rng: R,
    params: SeedParams,
    generation: u64,
    population: usize,
}

impl<V: CellView> LifeEngine<V> {
    /// Builds an engine from a host configuration.
    ///
    /// `config.seed` selects a reproducible ChaCha stream; without it the
    /// stream is seeded from OS entropy.
    ///
    /// # Errors
    ///
    /// Returns the validation error if `config` is not startable.
    pub fn from_config(config: &LifeConfig, view: V) -> LifeResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self::with_rng(config.pool_size, config.seed_params(), view, rng)
    }
}

impl<V: CellView, R: Rng> LifeEngine<V, R> {
    /// Pre-allocates the pool and seeds a fresh grid from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidPoolSize`] or the [`SeedParams`]
    /// validation error.
    pub fn with_rng(pool_size: usize, params: SeedParams, view: V, rng: R) -> LifeResult<Self> {
        params.validate()?;
        let pool = CellPool::new(pool_size, view)?;
        let grid = LifeGrid::new(params.width, params.height)?;
        let next = vec![false; grid.len()];

        let mut engine = Self {
            grid,
            next,
            pool,
            rng,
            params,
            generation: 0,
            population: 0,
        };
        engine.seed()?;
        Ok(engine)
    }

    /// Samples every position alive with `params.live_probability`.
    ///
    /// Expects an all-dead grid.
    fn seed(&mut self) -> LifeResult<()> {
        let alive = Bernoulli::new(self.params.live_probability)
            .map_err(|_| LifeError::InvalidProbability(self.params.live_probability))?;

        let width = self.grid.width();
        for index in 0..self.grid.len() {
            if alive.sample(&mut self.rng) {
                let position = self.position_of(index % width, index / width);
                self.grid.set_slot(index, Some(self.pool.acquire(position)));
                self.population += 1;
            }
        }

        debug!(
            width,
            height = self.grid.height(),
            population = self.population,
            "session seeded"
        );
        Ok(())
    }

    #[inline]
    fn position_of(&self, x: usize, y: usize) -> CellPosition {
        CellPosition::from_grid(x, y, self.params.cell_size)
    }

    /// Advances one generation.
    ///
    /// The generation counter increases by one even when nothing is alive.
    pub fn tick(&mut self) -> TickReport {
        let width = self.grid.width();

        // Pass 1: read the grid, write the bitmap.
        for y in 0..self.grid.height() {
            for x in 0..width {
                let index = y * width + x;
                let alive = self.grid.slot(index).is_some();
                self.next[index] = rules::next_state(alive, self.grid.live_neighbors(x, y));
            }
        }

        // Pass 2: deaths. Freed handles go back before any birth asks for one,
        // so a population within capacity never touches overflow.
        let mut deaths = 0;
        for (index, &alive_next) in self.next.iter().enumerate() {
            if alive_next {
                continue;
            }
            if let Some(id) = self.grid.slot(index) {
                // Return the handle before the grid forgets it.
                self.pool.release(id);
                self.grid.set_slot(index, None);
                deaths += 1;
            }
        }

        // Pass 3: births.
        let mut births = 0;
        let mut population = 0;
        let mut overflowed = false;
        for (index, &alive_next) in self.next.iter().enumerate() {
            if !alive_next {
                continue;
            }
            population += 1;
            if self.grid.slot(index).is_none() {
                let position = self.position_of(index % width, index / width);
                overflowed |= self.pool.available_count() == 0;
                self.grid.set_slot(index, Some(self.pool.acquire(position)));
                births += 1;
            }
        }

        self.population = population;
        self.generation += 1;

        let report = TickReport {
            generation: self.generation,
            population,
            births,
            deaths,
            overflowed,
        };
        trace!(?report, "tick");
        report
    }

    /// Tears the session down and seeds a new one.
    ///
    /// Every live handle goes back to the pool, both counters return to zero
    /// and the grid is rebuilt at the new size. Randomness continues from the
    /// engine's stream, so a seeded engine restarts reproducibly.
    ///
    /// # Errors
    ///
    /// Returns the [`SeedParams`] validation error; the current session is
    /// left untouched in that case.
    pub fn restart(&mut self, params: SeedParams) -> LifeResult<()> {
        params.validate()?;
        let grid = LifeGrid::new(params.width, params.height)?;

        self.release_all();
        self.generation = 0;
        self.next = vec![false; grid.len()];
        self.grid = grid;
        self.params = params;
        self.seed()?;

        debug!(
            population = self.population,
            pool_available = self.pool.available_count(),
            "session restarted"
        );
        Ok(())
    }

    /// Kills every cell. The generation counter is kept.
    pub fn clear(&mut self) {
        self.release_all();
    }

    fn release_all(&mut self) {
        for index in 0..self.grid.len() {
            if let Some(id) = self.grid.slot(index) {
                self.pool.release(id);
                self.grid.set_slot(index, None);
            }
        }
        self.population = 0;
    }

    /// Sets one cell alive or dead between ticks.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::OutOfBounds`] if `(x, y)` is outside the grid.
    pub fn set_cell(&mut self, x: usize, y: usize, alive: bool) -> LifeResult<()> {
        let index = self.grid.index(x, y).ok_or(LifeError::OutOfBounds {
            x,
            y,
            width: self.grid.width(),
            height: self.grid.height(),
        })?;

        match (self.grid.slot(index), alive) {
            (None, true) => {
                let position = self.position_of(x, y);
                self.grid.set_slot(index, Some(self.pool.acquire(position)));
                self.population += 1;
            }
            (Some(id), false) => {
                self.pool.release(id);
                self.grid.set_slot(index, None);
                self.population -= 1;
            }
            _ => {}
        }
        Ok(())
    }

    /// Stamps `pattern` with its top-left corner at `(x, y)`.
    ///
    /// Cells outside the pattern are left as they are.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::PatternDoesNotFit`] without touching the grid if
    /// any part of the pattern would fall outside it.
    pub fn place_pattern(&mut self, pattern: &Pattern, x: usize, y: usize) -> LifeResult<()> {
        let fits = x
            .checked_add(pattern.width)
            .zip(y.checked_add(pattern.height))
            .is_some_and(|(right, bottom)| right <= self.grid.width() && bottom <= self.grid.height());
        if !fits {
            return Err(LifeError::PatternDoesNotFit {
                pattern: pattern.name,
                x,
                y,
            });
        }

        for &(dx, dy) in pattern.cells {
            self.set_cell(x + dx, y + dy, true)?;
        }
        Ok(())
    }

    /// Generations completed since the session was seeded.
    #[inline]
    #[must_use]
    pub const fn generation_count(&self) -> u64 {
        self.generation
    }

    /// Live cells after the last completed tick.
    #[inline]
    #[must_use]
    pub const fn population_count(&self) -> usize {
        self.population
    }

    /// The live grid.
    #[inline]
    #[must_use]
    pub const fn grid(&self) -> &LifeGrid {
        &self.grid
    }

    /// The cell pool.
    #[inline]
    #[must_use]
    pub const fn pool(&self) -> &CellPool<V> {
        &self.pool
    }

    /// Pool accounting snapshot.
    #[inline]
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Parameters of the current session.
    #[inline]
    #[must_use]
    pub const fn params(&self) -> SeedParams {
        self.params
    }

    /// Next-generation bitmap computed by the last tick.
    #[inline]
    #[must_use]
    pub fn next_generation(&self) -> &[bool] {
        &self.next
    }

    /// Text frame of the grid: `#` alive, `.` dead, one line per row.
    #[must_use]
    pub fn render_ascii(&self) -> String {
        let width = self.grid.width();
        let mut frame = String::with_capacity((width + 1) * self.grid.height());
        for y in 0..self.grid.height() {
            for x in 0..width {
                frame.push(if self.grid.is_alive(x, y) { '#' } else { '.' });
            }
            frame.push('\n');
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::{BLINKER, BLOCK, GLIDER};
    use crate::view::{LedgerView, NullView};

    fn params(width: usize, height: usize, live_probability: f64) -> SeedParams {
        SeedParams {
            width,
            height,
            cell_size: 1.0,
            live_probability,
        }
    }

    fn empty(width: usize, height: usize) -> LifeEngine<LedgerView> {
        LifeEngine::with_rng(
            64,
            params(width, height, 0.0),
            LedgerView::new(),
            ChaCha8Rng::seed_from_u64(0),
        )
        .unwrap()
    }

    fn live_cells<V: CellView, R: Rng>(engine: &LifeEngine<V, R>) -> Vec<(usize, usize)> {
        engine.grid().iter_live().map(|(x, y, _)| (x, y)).collect()
    }

    #[test]
    fn test_probability_extremes() {
        let none = empty(10, 10);
        assert_eq!(none.population_count(), 0);

        let full = LifeEngine::with_rng(
            100,
            params(10, 10, 1.0),
            NullView,
            ChaCha8Rng::seed_from_u64(1),
        )
        .unwrap();
        assert_eq!(full.population_count(), 100);
        assert_eq!(full.pool().available_count(), 0);
    }

    #[test]
    fn test_block_is_still() {
        let mut engine = empty(6, 6);
        engine.place_pattern(&BLOCK, 2, 2).unwrap();
        let before = live_cells(&engine);

        for _ in 0..5 {
            let report = engine.tick();
            assert_eq!(report.births, 0);
            assert_eq!(report.deaths, 0);
        }
        assert_eq!(live_cells(&engine), before);
        assert_eq!(engine.generation_count(), 5);
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut engine = empty(5, 5);
        engine.place_pattern(&BLINKER, 1, 2).unwrap();

        engine.tick();
        assert_eq!(live_cells(&engine), vec![(2, 1), (2, 2), (2, 3)]);

        engine.tick();
        assert_eq!(live_cells(&engine), vec![(1, 2), (2, 2), (3, 2)]);
    }

    #[test]
    fn test_handles_follow_births() {
        let mut engine = empty(5, 5);
        engine.place_pattern(&BLINKER, 1, 2).unwrap();
        engine.tick();

        let id = engine.grid().handle_at(2, 1).unwrap();
        let handle = engine.pool().get(id).unwrap();
        assert!(handle.is_alive());
        assert_eq!(handle.position(), CellPosition::new(2.0, 1.0));
        assert_eq!(engine.pool().view().active_count(), 3);
    }

    #[test]
    fn test_population_within_capacity_never_overflows() {
        let mut engine =
            LifeEngine::with_rng(3, params(5, 5, 0.0), LedgerView::new(), ChaCha8Rng::seed_from_u64(0)).unwrap();
        engine.place_pattern(&BLINKER, 1, 2).unwrap();
        assert_eq!(engine.pool().view().placements(), 3);

        // (2, 1) is born ahead of the row-2 deaths in index order.
        for _ in 0..4 {
            let report = engine.tick();
            assert!(!report.overflowed);
            assert_eq!(report.population, 3);
        }
        assert_eq!(engine.pool().view().placements(), 3);
        let stats = engine.pool_stats();
        assert_eq!(stats.exhaustion_events, 0);
        assert_eq!(stats.overflow_live + stats.overflow_parked, 0);
        assert!(engine.pool().check_invariants());
    }

    #[test]
    fn test_overflowed_births_are_reported() {
        let mut roomy = empty(5, 5);
        roomy.place_pattern(&BLINKER, 1, 2).unwrap();
        assert!(!roomy.tick().overflowed);

        // Three live cells, one pooled handle: some birth must overflow.
        let mut tight =
            LifeEngine::with_rng(1, params(5, 5, 0.0), LedgerView::new(), ChaCha8Rng::seed_from_u64(0)).unwrap();
        tight.place_pattern(&BLINKER, 1, 2).unwrap();
        let report = tight.tick();
        assert!(report.overflowed);
        assert_eq!(report.population, 3);
        assert_eq!(tight.pool_stats().overflow_live, 2);
        assert!(tight.pool().check_invariants());
    }

    #[test]
    fn test_dead_grid_still_ages() {
        let mut engine = empty(4, 4);
        for expected in 1..=3 {
            let report = engine.tick();
            assert_eq!(report.generation, expected);
            assert_eq!(report.population, 0);
        }
    }

    #[test]
    fn test_zero_sized_grid() {
        let mut engine = empty(0, 7);
        assert_eq!(engine.population_count(), 0);
        engine.tick();
        engine.tick();
        assert_eq!(engine.generation_count(), 2);
        assert_eq!(engine.render_ascii(), "\n".repeat(7));
    }

    #[test]
    fn test_set_cell_bounds() {
        let mut engine = empty(3, 3);
        assert!(matches!(
            engine.set_cell(3, 0, true),
            Err(LifeError::OutOfBounds { x: 3, y: 0, .. })
        ));
        engine.set_cell(1, 1, true).unwrap();
        engine.set_cell(1, 1, true).unwrap();
        assert_eq!(engine.population_count(), 1);
        engine.set_cell(1, 1, false).unwrap();
        assert_eq!(engine.population_count(), 0);
        assert!(engine.pool().check_invariants());
    }

    #[test]
    fn test_pattern_must_fit() {
        let mut engine = empty(4, 4);
        assert!(matches!(
            engine.place_pattern(&GLIDER, 2, 0),
            Err(LifeError::PatternDoesNotFit { pattern: "glider", .. })
        ));
        assert_eq!(engine.population_count(), 0);
    }

    #[test]
    fn test_restart_rejects_bad_params_without_damage() {
        let mut engine = empty(5, 5);
        engine.place_pattern(&BLOCK, 0, 0).unwrap();
        engine.tick();

        assert!(engine.restart(params(5, 5, 2.0)).is_err());
        assert_eq!(engine.population_count(), 4);
        assert_eq!(engine.generation_count(), 1);
    }

    #[test]
    fn test_clear_keeps_generation() {
        let mut engine = empty(5, 5);
        engine.place_pattern(&BLOCK, 1, 1).unwrap();
        engine.tick();
        engine.clear();

        assert_eq!(engine.population_count(), 0);
        assert_eq!(engine.generation_count(), 1);
        assert_eq!(engine.pool().in_use_count(), 0);
    }

    #[test]
    fn test_render_ascii() {
        let mut engine = empty(3, 2);
        engine.set_cell(0, 0, true).unwrap();
        engine.set_cell(2, 1, true).unwrap();
        assert_eq!(engine.render_ascii(), "#..\n..#\n");
    }
}
