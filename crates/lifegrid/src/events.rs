//! # Observer Events
//!
//! One-way notifications from the tick thread to displays.
//!
//! The tick thread holds the only [`EventSender`]; any number of
//! [`EventReceiver`] clones share one queue, so each event reaches exactly
//! one of them.
//!
//! The channel is bounded. A slow observer loses events instead of stalling
//! the cadence.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Default event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Something an observer may want to display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LifeEvent {
    /// A generation completed.
    GenerationAdvanced {
        /// Generation reached.
        generation: u64,
        /// Live cells.
        population: usize,
        /// Cells born this generation.
        births: usize,
        /// Cells that died this generation.
        deaths: usize,
    },

    /// Births in this generation needed overflow handles.
    PoolExhausted {
        /// Generation in which it happened.
        generation: u64,
        /// Overflow handles alive after the tick.
        overflow_live: usize,
    },

    /// A fresh session was seeded.
    Restarted {
        /// Grid columns.
        width: usize,
        /// Grid rows.
        height: usize,
        /// Live cells after seeding.
        population: usize,
    },

    /// The cadence stopped.
    Paused,

    /// The cadence started again.
    Resumed,
}

/// Bounded event channel.
pub struct EventBus {
    sender: Sender<LifeEvent>,
    receiver: Receiver<LifeEvent>,
}

impl EventBus {
    /// Creates a channel holding at most `capacity` undelivered events.
    ///
    /// A zero capacity would drop every event, so it is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self { sender, receiver }
    }

    /// Returns a sending end.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Returns a receiving end. Clones share one queue.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.receiver.clone(),
        }
    }

}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// Sending end, held by the tick thread.
#[derive(Clone)]
pub struct EventSender {
    sender: Sender<LifeEvent>,
}

impl EventSender {
    /// Sends without blocking. Returns false if the event was dropped.
    #[inline]
    pub fn send(&self, event: LifeEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            // Full: observers are behind, the cadence wins.
            Err(TrySendError::Full(_)) => false,
            // No observers left.
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Receiving end, held by observers.
#[derive(Clone)]
pub struct EventReceiver {
    receiver: Receiver<LifeEvent>,
}

impl EventReceiver {
    /// Takes every pending event.
    #[must_use]
    pub fn drain(&self) -> Vec<LifeEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes one pending event, if any.
    #[inline]
    #[must_use]
    pub fn try_recv(&self) -> Option<LifeEvent> {
        self.receiver.try_recv().ok()
    }

    /// Waits up to `timeout` for the next event.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<LifeEvent> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Number of undelivered events.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Whether any event is waiting.
    #[inline]
    #[must_use]
    pub fn has_events(&self) -> bool {
        !self.receiver.is_empty()
    }
}
