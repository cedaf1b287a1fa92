//! Integration tests for the simulation engine and its cell pool.

use std::collections::HashSet;

use lifegrid_core::patterns::{BEACON, BEEHIVE, BLINKER, BLOCK, GLIDER, TOAD};
use lifegrid_core::{CellView, LedgerView, LifeConfig, LifeEngine, NullView, SeedParams};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn seeded<V: CellView>(width: usize, height: usize, pool_size: usize, seed: u64, view: V) -> LifeEngine<V> {
    let params = SeedParams {
        width,
        height,
        cell_size: 0.1,
        live_probability: 0.3,
    };
    LifeEngine::with_rng(pool_size, params, view, ChaCha8Rng::seed_from_u64(seed)).unwrap()
}

fn blank(width: usize, height: usize) -> LifeEngine<LedgerView> {
    let params = SeedParams {
        width,
        height,
        cell_size: 1.0,
        live_probability: 0.0,
    };
    LifeEngine::with_rng(256, params, LedgerView::new(), ChaCha8Rng::seed_from_u64(0)).unwrap()
}

fn live_set<V: CellView>(engine: &LifeEngine<V>) -> HashSet<(usize, usize)> {
    engine.grid().iter_live().map(|(x, y, _)| (x, y)).collect()
}

/// Straightforward reference step on a bounded plane.
fn step_naive(cells: &HashSet<(usize, usize)>, width: usize, height: usize) -> HashSet<(usize, usize)> {
    let mut next = HashSet::new();
    for y in 0..height {
        for x in 0..width {
            let mut neighbors = 0;
            for dy in -1isize..=1 {
                for dx in -1isize..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (Some(nx), Some(ny)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                        continue;
                    };
                    if cells.contains(&(nx, ny)) {
                        neighbors += 1;
                    }
                }
            }
            let alive = cells.contains(&(x, y));
            if (alive && (neighbors == 2 || neighbors == 3)) || (!alive && neighbors == 3) {
                next.insert((x, y));
            }
        }
    }
    next
}

fn assert_consistent<V: CellView>(engine: &LifeEngine<V>) {
    let grid_live = engine.grid().live_count();
    let bitmap_live = engine.next_generation().iter().filter(|&&alive| alive).count();
    assert_eq!(engine.population_count(), grid_live);
    assert_eq!(engine.population_count(), bitmap_live);
    assert!(engine.pool().check_invariants());

    let stats = engine.pool_stats();
    assert_eq!(stats.available + stats.in_use, stats.capacity);
    assert_eq!(stats.in_use + stats.overflow_live, grid_live);

    // No handle backs two positions.
    let mut seen = HashSet::new();
    for (_, _, id) in engine.grid().iter_live() {
        assert!(seen.insert(id), "handle {id:?} referenced twice");
        assert!(engine.pool().is_in_use(id));
    }
}

#[test]
fn test_matches_reference_step() {
    let mut engine = seeded(40, 30, 1200, 11, NullView);
    for _ in 0..25 {
        let expected = step_naive(&live_set(&engine), 40, 30);
        engine.tick();
        assert_eq!(live_set(&engine), expected);
    }
}

#[test]
fn test_population_and_pool_invariants_hold() {
    let mut engine = seeded(64, 48, 2000, 3, LedgerView::new());
    assert_eq!(engine.population_count(), engine.grid().live_count());
    assert!(engine.pool().check_invariants());

    for _ in 0..50 {
        engine.tick();
        assert_consistent(&engine);
    }
}

#[test]
fn test_view_mirrors_grid() {
    let mut engine = seeded(32, 32, 600, 5, LedgerView::new());
    for _ in 0..10 {
        engine.tick();
    }

    let view = engine.pool().view();
    assert_eq!(view.active_count(), engine.population_count());
    for (_, _, id) in engine.grid().iter_live() {
        let handle = engine.pool().get(id).unwrap();
        let cell = view.cells()[*handle.view_handle()];
        assert!(cell.active && cell.alive);
        assert_eq!(cell.position, handle.position());
    }
}

#[test]
fn test_steady_state_places_no_new_handles() {
    let mut engine = seeded(48, 48, 2304, 9, LedgerView::new());
    let placed = engine.pool().view().placements();
    for _ in 0..40 {
        engine.tick();
    }
    assert_eq!(engine.pool().view().placements(), placed);
    assert_eq!(engine.pool_stats().exhaustion_events, 0);
}

#[test]
fn test_pool_sized_to_peak_population_never_overflows() {
    let mut reference = seeded(48, 36, 48 * 36, 13, NullView);
    let mut peak = reference.population_count();
    for _ in 0..60 {
        peak = peak.max(reference.tick().population);
    }

    let mut engine = seeded(48, 36, peak, 13, LedgerView::new());
    for _ in 0..60 {
        assert!(!engine.tick().overflowed);
        assert_consistent(&engine);
    }
    assert_eq!(engine.pool().view().placements(), peak);
    let stats = engine.pool_stats();
    assert_eq!(stats.exhaustion_events, 0);
    assert_eq!(stats.overflow_live + stats.overflow_parked, 0);
}

#[test]
fn test_undersized_pool_keeps_running() {
    // 30% of 2500 cells is far above 50 handles.
    let mut engine = seeded(50, 50, 50, 21, LedgerView::new());
    assert!(engine.pool_stats().overflow_live > 0);
    assert!(engine.pool_stats().exhaustion_events > 0);

    let mut reference = seeded(50, 50, 5000, 21, NullView);
    for _ in 0..20 {
        engine.tick();
        reference.tick();
        assert_consistent(&engine);
        assert_eq!(live_set(&engine), live_set(&reference));
    }
    assert_eq!(engine.pool_stats().capacity, 50);
}

#[test]
fn test_corner_cell_has_three_neighbors_at_most() {
    let mut engine = blank(8, 8);
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (7, 7), (7, 0), (0, 7)] {
        engine.set_cell(x, y, true).unwrap();
    }
    assert_eq!(engine.grid().live_neighbors(0, 0), 3);

    // (0,0) survives with exactly the three in-bounds neighbors; no wrap births.
    engine.tick();
    assert!(engine.grid().is_alive(0, 0));
    assert!(!engine.grid().is_alive(7, 7));
}

#[test]
fn test_determinism_with_same_seed() {
    let mut a = seeded(60, 40, 5000, 1234, NullView);
    let mut b = seeded(60, 40, 5000, 1234, NullView);
    assert_eq!(a.render_ascii(), b.render_ascii());
    for _ in 0..30 {
        assert_eq!(a.tick(), b.tick());
        assert_eq!(a.render_ascii(), b.render_ascii());
    }

    let c = seeded(60, 40, 5000, 4321, NullView);
    assert_ne!(a.render_ascii(), c.render_ascii());
}

#[test]
fn test_still_lifes_are_stable() {
    for (pattern, origin) in [(&BLOCK, 5), (&BEEHIVE, 4)] {
        let mut engine = blank(12, 12);
        engine.place_pattern(pattern, origin, origin).unwrap();
        let before = live_set(&engine);
        for _ in 0..20 {
            engine.tick();
        }
        assert_eq!(live_set(&engine), before, "{}", pattern.name);
    }
}

#[test]
fn test_oscillators_have_period_two() {
    for pattern in [&BLINKER, &TOAD, &BEACON] {
        let mut engine = blank(12, 12);
        engine.place_pattern(pattern, 4, 4).unwrap();
        let phase_a = live_set(&engine);

        engine.tick();
        let phase_b = live_set(&engine);
        assert_ne!(phase_a, phase_b, "{}", pattern.name);

        engine.tick();
        assert_eq!(live_set(&engine), phase_a, "{}", pattern.name);
    }
}

#[test]
fn test_blinker_turns_vertical() {
    let mut engine = blank(9, 9);
    engine.place_pattern(&BLINKER, 3, 4).unwrap();

    engine.tick();
    let vertical: HashSet<_> = [(4, 3), (4, 4), (4, 5)].into_iter().collect();
    assert_eq!(live_set(&engine), vertical);

    engine.tick();
    let horizontal: HashSet<_> = [(3, 4), (4, 4), (5, 4)].into_iter().collect();
    assert_eq!(live_set(&engine), horizontal);
}

#[test]
fn test_glider_translates() {
    let mut engine = blank(16, 16);
    engine.place_pattern(&GLIDER, 1, 1).unwrap();
    let start = live_set(&engine);

    for _ in 0..4 {
        engine.tick();
    }
    let shifted: HashSet<_> = start.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
    assert_eq!(live_set(&engine), shifted);
}

#[test]
fn test_generation_is_monotonic() {
    let mut engine = seeded(20, 20, 400, 77, NullView);
    for expected in 1..=100 {
        assert_eq!(engine.tick().generation, expected);
        assert_eq!(engine.generation_count(), expected);
    }
}

#[test]
fn test_restart_resets_state() {
    let mut engine = seeded(40, 40, 1600, 8, LedgerView::new());
    for _ in 0..15 {
        engine.tick();
    }
    let placed = engine.pool().view().placements();

    let params = SeedParams {
        width: 30,
        height: 20,
        cell_size: 0.2,
        live_probability: 0.5,
    };
    engine.restart(params).unwrap();

    assert_eq!(engine.generation_count(), 0);
    assert_eq!(engine.grid().width(), 30);
    assert_eq!(engine.grid().height(), 20);
    assert_eq!(engine.params(), params);
    assert_eq!(engine.population_count(), engine.grid().live_count());
    assert_eq!(engine.pool().in_use_count(), engine.population_count());
    assert!(engine.pool().check_invariants());
    assert_eq!(engine.pool().view().active_count(), engine.population_count());
    // Restart recycles handles, it does not place new ones.
    assert_eq!(engine.pool().view().placements(), placed);

    engine.tick();
    assert_eq!(engine.generation_count(), 1);
}

#[test]
fn test_from_config() {
    let config = LifeConfig {
        width: 24,
        height: 12,
        pool_size: 300,
        seed: Some(99),
        ..LifeConfig::default()
    };
    let a = LifeEngine::from_config(&config, NullView).unwrap();
    let b = LifeEngine::from_config(&config, NullView).unwrap();
    assert_eq!(a.render_ascii(), b.render_ascii());
    assert_eq!(a.grid().len(), 288);

    let invalid = LifeConfig {
        height: 0,
        ..config
    };
    assert!(LifeEngine::from_config(&invalid, NullView).is_err());
}
