//! # Simulation Driver
//!
//! Owns the tick thread. The thread is the only writer of the engine:
//!
//! ```text
//! caller threads                     tick thread
//! ──────────────                     ───────────
//! restart()/pause() ──commands──>    apply command between ticks
//!                                    tick under the engine lock
//! counters()/with_engine() <──lock── (blocked until the tick is done)
//! events()          <──events──      GenerationAdvanced, Restarted, ...
//! ```
//!
//! Commands are applied between ticks, so a restart can never interleave
//! with a generation. Readers take the same lock as the tick, so they only
//! ever see completed generations.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};
use lifegrid_core::{CellView, LifeConfig, LifeEngine, LifeError, LifeResult, PoolStats, SeedParams};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::events::{EventBus, EventReceiver, EventSender, LifeEvent, DEFAULT_EVENT_CAPACITY};
use crate::tick::{TickLoop, TickStats};

/// Counters of the last completed generation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Generations since the session was seeded.
    pub generation: u64,
    /// Live cells.
    pub population: usize,
}

/// Requests sent to the tick thread.
enum Command {
    Restart {
        params: SeedParams,
        reply: Sender<LifeResult<()>>,
    },
    Pause,
    Resume,
    Shutdown,
}

/// Drives a [`LifeEngine`] on a fixed cadence from a dedicated thread.
pub struct SimulationDriver<V: CellView> {
    engine: Arc<Mutex<LifeEngine<V>>>,
    tick_stats: Arc<Mutex<TickStats>>,
    commands: Sender<Command>,
    events: EventReceiver,
    thread: Option<JoinHandle<()>>,
}

impl<V> SimulationDriver<V>
where
    V: CellView + Send + 'static,
    V::Handle: Send,
{
    /// Validates `config`, builds the engine and starts ticking.
    ///
    /// # Errors
    ///
    /// Returns the validation error; nothing is started in that case.
    pub fn start(config: &LifeConfig, view: V) -> LifeResult<Self> {
        let engine = LifeEngine::from_config(config, view)?;
        Self::spawn(engine, config.tick_interval()?, DEFAULT_EVENT_CAPACITY)
    }

    /// Starts ticking an existing engine every `tick_interval`.
    ///
    /// `event_capacity` is raised to at least one undelivered event.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::ThreadSpawn`] if the tick thread cannot be
    /// created; the engine is dropped in that case.
    pub fn spawn(
        engine: LifeEngine<V>,
        tick_interval: Duration,
        event_capacity: usize,
    ) -> LifeResult<Self> {
        let engine = Arc::new(Mutex::new(engine));
        let tick_stats = Arc::new(Mutex::new(TickStats::default()));
        let (commands, inbox) = unbounded();
        let bus = EventBus::new(event_capacity);
        let events = bus.receiver();

        let worker = Worker {
            engine: Arc::clone(&engine),
            tick_stats: Arc::clone(&tick_stats),
            inbox,
            events: bus.sender(),
            cadence: TickLoop::new(tick_interval),
        };
        let thread = std::thread::Builder::new()
            .name("lifegrid-tick".into())
            .spawn(move || worker.run())
            .map_err(LifeError::ThreadSpawn)?;

        info!(interval = ?tick_interval, "simulation driver started");

        Ok(Self {
            engine,
            tick_stats,
            commands,
            events,
            thread: Some(thread),
        })
    }
}

impl<V: CellView> SimulationDriver<V> {
    /// Stops the cadence, reseeds the session with `params`, then lets the
    /// cadence continue. Blocks until the new session is in place.
    ///
    /// A paused driver stays paused.
    ///
    /// # Errors
    ///
    /// Returns the [`SeedParams`] validation error (the old session keeps
    /// running) or [`LifeError::DriverStopped`].
    pub fn restart(&self, params: SeedParams) -> LifeResult<()> {
        let (reply, outcome) = bounded(1);
        self.send(Command::Restart { params, reply })?;
        outcome.recv().map_err(|_| LifeError::DriverStopped)?
    }

    /// Stops the cadence. Counters stay readable.
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::DriverStopped`] if the tick thread is gone.
    pub fn pause(&self) -> LifeResult<()> {
        self.send(Command::Pause)
    }

    /// Restarts the cadence after [`SimulationDriver::pause`].
    ///
    /// # Errors
    ///
    /// Returns [`LifeError::DriverStopped`] if the tick thread is gone.
    pub fn resume(&self) -> LifeResult<()> {
        self.send(Command::Resume)
    }

    fn send(&self, command: Command) -> LifeResult<()> {
        if self.thread.is_none() {
            return Err(LifeError::DriverStopped);
        }
        self.commands
            .send(command)
            .map_err(|_| LifeError::DriverStopped)
    }

    /// Counters of the last completed generation.
    #[must_use]
    pub fn counters(&self) -> Counters {
        let engine = self.engine.lock();
        Counters {
            generation: engine.generation_count(),
            population: engine.population_count(),
        }
    }

    /// Pool accounting of the last completed generation.
    #[must_use]
    pub fn pool_stats(&self) -> PoolStats {
        self.engine.lock().pool_stats()
    }

    /// Cadence timing statistics.
    #[must_use]
    pub fn tick_stats(&self) -> TickStats {
        *self.tick_stats.lock()
    }

    /// Read-only access to the engine between generations.
    pub fn with_engine<T>(&self, read: impl FnOnce(&LifeEngine<V>) -> T) -> T {
        let engine = self.engine.lock();
        read(&*engine)
    }

    /// Observer event stream.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.events.clone()
    }

    /// Whether the tick thread is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|thread| !thread.is_finished())
    }

    /// Stops the tick thread and waits for it.
    pub fn shutdown(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.commands.send(Command::Shutdown);
            if thread.join().is_err() {
                warn!("tick thread panicked");
            }
            debug!("simulation driver stopped");
        }
    }
}

impl<V: CellView> Drop for SimulationDriver<V> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// State owned by the tick thread.
struct Worker<V: CellView> {
    engine: Arc<Mutex<LifeEngine<V>>>,
    tick_stats: Arc<Mutex<TickStats>>,
    inbox: Receiver<Command>,
    events: EventSender,
    cadence: TickLoop,
}

impl<V: CellView> Worker<V> {
    fn run(mut self) {
        loop {
            while self.cadence.should_tick() {
                self.tick();
            }

            let wait = self.cadence.time_until_next_tick();
            let command = if wait == Duration::MAX {
                match self.inbox.recv() {
                    Ok(command) => command,
                    Err(_) => return,
                }
            } else {
                match self.inbox.recv_timeout(wait) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            };

            if !self.apply(command) {
                return;
            }
        }
    }

    fn tick(&mut self) {
        let start = self.cadence.begin_tick();
        let (report, pool) = {
            let mut engine = self.engine.lock();
            let report = engine.tick();
            (report, engine.pool_stats())
        };
        self.cadence.end_tick(start);
        *self.tick_stats.lock() = *self.cadence.stats();

        self.events.send(LifeEvent::GenerationAdvanced {
            generation: report.generation,
            population: report.population,
            births: report.births,
            deaths: report.deaths,
        });
        if report.overflowed {
            self.events.send(LifeEvent::PoolExhausted {
                generation: report.generation,
                overflow_live: pool.overflow_live,
            });
        }
    }

    /// Applies one command. Returns false when the thread should exit.
    fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Restart { params, reply } => {
                let was_paused = self.cadence.is_paused();
                self.cadence.pause();

                let outcome = {
                    let mut engine = self.engine.lock();
                    engine
                        .restart(params)
                        .map(|()| (engine.grid().width(), engine.grid().height(), engine.population_count()))
                };

                let result = match outcome {
                    Ok((width, height, population)) => {
                        self.cadence.reset_stats();
                        *self.tick_stats.lock() = *self.cadence.stats();
                        info!(width, height, population, "simulation restarted");
                        self.events.send(LifeEvent::Restarted {
                            width,
                            height,
                            population,
                        });
                        Ok(())
                    }
                    Err(err) => {
                        warn!(%err, "restart rejected");
                        Err(err)
                    }
                };

                if !was_paused {
                    self.cadence.resume();
                }
                // The caller may have given up waiting.
                let _ = reply.send(result);
                true
            }
            Command::Pause => {
                if !self.cadence.is_paused() {
                    self.cadence.pause();
                    self.events.send(LifeEvent::Paused);
                }
                true
            }
            Command::Resume => {
                if self.cadence.is_paused() {
                    self.cadence.resume();
                    self.events.send(LifeEvent::Resumed);
                }
                true
            }
            Command::Shutdown => false,
        }
    }
}
