//! # LIFEGRID
//!
//! Runs a [`LifeEngine`](lifegrid_core::LifeEngine) on a fixed cadence and
//! reports what happens to observers.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SIMULATION DRIVER                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │                                                             │
//! │  ┌──────────────┐    ┌──────────────┐    ┌──────────────┐   │
//! │  │   Cadence    │───>│  LifeEngine  │───>│   Events     │   │
//! │  │  (TickLoop)  │    │  (one lock)  │    │  (bounded)   │   │
//! │  └──────────────┘    └──────▲───────┘    └──────────────┘   │
//! │                             │                               │
//! │                     restart / pause / resume                │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `driver`: Tick thread ownership and control commands
//! - `events`: Observer notifications
//! - `tick`: Fixed-interval cadence

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod driver;
pub mod events;
pub mod tick;

pub use lifegrid_core as core;

pub use driver::{Counters, SimulationDriver};
pub use events::{EventBus, EventReceiver, EventSender, LifeEvent};
pub use tick::{TickLoop, TickStats};
