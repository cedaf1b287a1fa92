//! # Cell Pool
//!
//! Fixed-capacity allocator for renderable cell handles.
//!
//! Every pooled handle is created once, up front, and afterwards only moves
//! between the available free list and the in-use set. When the free list is
//! empty the pool falls back to overflow handles so a tick never fails;
//! those never join the fixed set.

use tracing::{debug, warn};

use crate::error::{LifeError, LifeResult};
use crate::view::{CellPosition, CellView};

/// Identifier of a handle owned by a [`CellPool`].
///
/// The grid stores copies of this id while a cell is alive. It carries no
/// ownership; the pool is the only owner of the handle behind it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellId(u32);

impl CellId {
    /// Index of the slot inside the pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Live handles never outnumber grid cells, and grids are capped at
    /// `u32::MAX` cells.
    #[allow(clippy::cast_possible_truncation)]
    const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

/// A pooled, renderable cell.
#[derive(Debug)]
pub struct CellHandle<H> {
    view: H,
    position: CellPosition,
    alive: bool,
    active: bool,
    in_use: bool,
    pooled: bool,
}

impl<H> CellHandle<H> {
    /// The host view handle behind this cell.
    #[inline]
    pub const fn view_handle(&self) -> &H {
        &self.view
    }

    /// Last position assigned.
    #[inline]
    pub const fn position(&self) -> CellPosition {
        self.position
    }

    /// Whether the cell is marked alive.
    #[inline]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }

    /// Whether the cell is shown.
    #[inline]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the handle belongs to the fixed set (not overflow).
    #[inline]
    pub const fn is_pooled(&self) -> bool {
        self.pooled
    }
}

/// Pool accounting snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Size of the fixed set.
    pub capacity: usize,
    /// Fixed handles ready to be acquired.
    pub available: usize,
    /// Fixed handles currently backing a live cell.
    pub in_use: usize,
    /// Overflow handles currently backing a live cell.
    pub overflow_live: usize,
    /// Overflow handles released and parked for reuse.
    pub overflow_parked: usize,
    /// Acquires that found the fixed set empty.
    pub exhaustion_events: u64,
    /// Releases of handles that were not in use.
    pub invalid_releases: u64,
}

/// Fixed-capacity pool of cell handles.
///
/// `acquire` and `release` are **O(1)**. As long as the live population stays
/// at or below the capacity, no handle is ever created after construction.
///
/// # Thread Safety
///
/// This pool is NOT thread-safe. The engine that owns it is the only writer.
pub struct CellPool<V: CellView> {
    /// Host view driven by every state change.
    view: V,
    /// All handles: `0..capacity` are the fixed set, the rest are overflow.
    slots: Vec<CellHandle<V::Handle>>,
    /// Free list of fixed handles.
    available: Vec<CellId>,
    /// Released overflow handles.
    overflow_parked: Vec<CellId>,
    /// Size of the fixed set.
    capacity: usize,
    /// Fixed handles in use.
    in_use: usize,
    /// Overflow handles in use.
    overflow_live: usize,
    exhaustion_events: u64,
    invalid_releases: u64,
    /// Set while the fixed set is drained, so exhaustion warns once per episode.
    exhausted: bool,
}

impl<V: CellView> CellPool<V> {
    /// Creates a pool and places all `capacity` handles, deactivated.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::InvalidPoolSize`] when `capacity` is zero or does
    /// not fit a handle id.
    pub fn new(capacity: usize, mut view: V) -> LifeResult<Self> {
        let count = match u32::try_from(capacity) {
            Ok(0) | Err(_) => return Err(LifeError::InvalidPoolSize),
            Ok(count) => count,
        };

        let mut slots = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            slots.push(Self::place_inactive(&mut view, true));
        }

        // Reversed so the lowest ids are handed out first.
        let available = (0..count).rev().map(CellId).collect();

        debug!(capacity, "cell pool pre-allocated");

        Ok(Self {
            view,
            slots,
            available,
            overflow_parked: Vec::new(),
            capacity,
            in_use: 0,
            overflow_live: 0,
            exhaustion_events: 0,
            invalid_releases: 0,
            exhausted: false,
        })
    }

    fn place_inactive(view: &mut V, pooled: bool) -> CellHandle<V::Handle> {
        let position = CellPosition::default();
        let handle = view.place(position);
        view.set_active(&handle, false);
        view.set_visual_alive(&handle, false);
        CellHandle {
            view: handle,
            position,
            alive: false,
            active: false,
            in_use: false,
            pooled,
        }
    }

    /// Size of the fixed set.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fixed handles ready to be acquired.
    #[inline]
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    /// Fixed handles currently in use.
    #[inline]
    #[must_use]
    pub const fn in_use_count(&self) -> usize {
        self.in_use
    }

    /// Accounting snapshot.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity,
            available: self.available.len(),
            in_use: self.in_use,
            overflow_live: self.overflow_live,
            overflow_parked: self.overflow_parked.len(),
            exhaustion_events: self.exhaustion_events,
            invalid_releases: self.invalid_releases,
        }
    }

    /// Hands out a handle positioned at `position`, active and alive.
    ///
    /// Never fails. On exhaustion a parked overflow handle is reused, or a new
    /// overflow handle is placed, and a warning is logged once per episode.
    pub fn acquire(&mut self, position: CellPosition) -> CellId {
        let id = if let Some(id) = self.available.pop() {
            self.in_use += 1;
            id
        } else {
            self.acquire_overflow()
        };

        let slot = &mut self.slots[id.index()];
        slot.in_use = true;
        slot.position = position;
        slot.active = true;
        slot.alive = true;
        self.view.set_position(&slot.view, position);
        self.view.set_active(&slot.view, true);
        self.view.set_visual_alive(&slot.view, true);
        id
    }

    fn acquire_overflow(&mut self) -> CellId {
        self.exhaustion_events += 1;
        if !self.exhausted {
            self.exhausted = true;
            warn!(
                capacity = self.capacity,
                overflow_live = self.overflow_live,
                "cell pool exhausted, falling back to overflow handles"
            );
        }

        self.overflow_live += 1;
        if let Some(id) = self.overflow_parked.pop() {
            return id;
        }

        let index = self.slots.len();
        let handle = Self::place_inactive(&mut self.view, false);
        self.slots.push(handle);
        CellId::from_index(index)
    }

    /// Returns a handle, marking it dead and inactive.
    ///
    /// Releasing a handle that is not in use is a caller bug. Debug builds
    /// panic; release builds log a warning, count it and leave the pool
    /// untouched.
    pub fn release(&mut self, id: CellId) {
        let Some(slot) = self.slots.get_mut(id.index()) else {
            self.reject_release(id);
            return;
        };
        if !slot.in_use {
            self.reject_release(id);
            return;
        }

        slot.in_use = false;
        slot.alive = false;
        slot.active = false;
        self.view.set_visual_alive(&slot.view, false);
        self.view.set_active(&slot.view, false);

        if slot.pooled {
            self.in_use -= 1;
            self.available.push(id);
            self.exhausted = false;
        } else {
            self.overflow_live -= 1;
            self.overflow_parked.push(id);
        }
    }

    fn reject_release(&mut self, id: CellId) {
        self.invalid_releases += 1;
        warn!(cell = id.index(), "ignored release of a cell handle that is not in use");
        if cfg!(debug_assertions) {
            panic!("released cell handle {} that is not in use", id.index());
        }
    }

    /// Whether `id` currently backs a live cell.
    #[inline]
    #[must_use]
    pub fn is_in_use(&self, id: CellId) -> bool {
        self.slots.get(id.index()).is_some_and(|slot| slot.in_use)
    }

    /// Looks up a handle.
    #[inline]
    #[must_use]
    pub fn get(&self, id: CellId) -> Option<&CellHandle<V::Handle>> {
        self.slots.get(id.index())
    }

    /// The host view.
    #[inline]
    pub const fn view(&self) -> &V {
        &self.view
    }

    /// Checks the accounting invariants.
    ///
    /// - `available + in_use == capacity`
    /// - no fixed handle is both free and in use, none is listed twice
    /// - overflow counters match the overflow slots
    #[must_use]
    pub fn check_invariants(&self) -> bool {
        if self.available.len() + self.in_use != self.capacity {
            return false;
        }

        let mut listed = vec![false; self.slots.len()];
        for id in self.available.iter().chain(&self.overflow_parked) {
            let index = id.index();
            if index >= self.slots.len() || listed[index] || self.slots[index].in_use {
                return false;
            }
            listed[index] = true;
        }

        let fixed_in_use = self.slots[..self.capacity]
            .iter()
            .filter(|slot| slot.in_use)
            .count();
        let overflow_in_use = self.slots[self.capacity..]
            .iter()
            .filter(|slot| slot.in_use)
            .count();

        fixed_in_use == self.in_use
            && overflow_in_use == self.overflow_live
            && self.overflow_live + self.overflow_parked.len() == self.slots.len() - self.capacity
    }
}
