//! `lifegrid` - headless Game of Life runner.
//!
//! Reads single-letter commands from stdin while the simulation runs:
//! `r` restart, `p` pause, `c` continue, `q` quit.

use std::io::BufRead;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use lifegrid::core::{LifeConfig, LifeEngine, NullView, Pattern};
use lifegrid::events::DEFAULT_EVENT_CAPACITY;
use lifegrid::{LifeEvent, SimulationDriver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long the main loop waits for an event before polling stdin again.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// LIFEGRID - Conway's Game of Life on a fixed grid
#[derive(Parser, Debug)]
#[command(name = "lifegrid")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "LIFEGRID_CONFIG")]
    config: Option<PathBuf>,

    /// Grid columns
    #[arg(long)]
    width: Option<usize>,

    /// Grid rows
    #[arg(long)]
    height: Option<usize>,

    /// World size of one cell
    #[arg(long)]
    cell_size: Option<f32>,

    /// Pre-allocated cell handles
    #[arg(long)]
    pool_size: Option<usize>,

    /// Probability that a cell starts alive
    #[arg(long)]
    live_probability: Option<f64>,

    /// Seconds between generations
    #[arg(long)]
    tick_interval: Option<f64>,

    /// RNG seed for reproducible runs
    #[arg(long, env = "LIFEGRID_SEED")]
    seed: Option<u64>,

    /// Quit after this many generations of the current session
    #[arg(short, long)]
    generations: Option<u64>,

    /// Log counters every N generations
    #[arg(long, default_value = "10")]
    report_every: u64,

    /// Print an ASCII frame with every report
    #[arg(long)]
    render: bool,

    /// Stamp a built-in pattern (block, glider, ...) at the grid center
    #[arg(long)]
    pattern: Option<String>,
}

impl Args {
    /// Loads the config file (or defaults) and applies CLI overrides on top.
    fn into_config(self) -> anyhow::Result<LifeConfig> {
        let mut config = match &self.config {
            Some(path) => LifeConfig::from_toml_file(path)?,
            None => LifeConfig::default(),
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(cell_size) = self.cell_size {
            config.cell_size = cell_size;
        }
        if let Some(pool_size) = self.pool_size {
            config.pool_size = pool_size;
        }
        if let Some(live_probability) = self.live_probability {
            config.live_probability = live_probability;
        }
        if let Some(tick_interval) = self.tick_interval {
            config.tick_interval_secs = tick_interval;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Operator input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Input {
    Restart,
    Pause,
    Continue,
    Quit,
}

impl Input {
    fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "r" | "R" => Some(Self::Restart),
            "p" | "P" => Some(Self::Pause),
            "c" | "C" => Some(Self::Continue),
            "q" | "Q" => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Forwards stdin lines as [`Input`]s. EOF reads as quit.
fn spawn_stdin_reader() -> anyhow::Result<Receiver<Input>> {
    let (sender, receiver) = unbounded();
    std::thread::Builder::new()
        .name("lifegrid-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                match Input::parse(&line) {
                    Some(input) => {
                        if sender.send(input).is_err() {
                            return;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => tracing::warn!(input = %line.trim(), "unknown command (r/p/c/q)"),
                }
            }
            let _ = sender.send(Input::Quit);
        })?;
    Ok(receiver)
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let report_every = args.report_every.max(1);
    let generations = args.generations;
    let render = args.render;
    let pattern = args.pattern.as_deref().map(Pattern::find).transpose()?;
    let config = args.into_config()?;

    tracing::info!(
        "Grid: {}x{} cells, pool: {} handles, interval: {}s",
        config.width,
        config.height,
        config.pool_size,
        config.tick_interval_secs
    );

    let mut engine = LifeEngine::from_config(&config, NullView)?;
    if let Some(pattern) = pattern {
        let x = config.width.saturating_sub(pattern.width) / 2;
        let y = config.height.saturating_sub(pattern.height) / 2;
        engine.place_pattern(pattern, x, y)?;
        tracing::info!("Pattern: {} at ({x}, {y})", pattern.name);
    }

    let mut driver =
        SimulationDriver::spawn(engine, config.tick_interval()?, DEFAULT_EVENT_CAPACITY)?;
    let events = driver.events();
    let inputs = spawn_stdin_reader()?;

    'run: loop {
        loop {
            let input = match inputs.try_recv() {
                Ok(input) => input,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'run,
            };
            match input {
                Input::Restart => driver.restart(config.seed_params())?,
                Input::Pause => driver.pause()?,
                Input::Continue => driver.resume()?,
                Input::Quit => break 'run,
            }
        }

        let Some(event) = events.recv_timeout(POLL_INTERVAL) else {
            if !driver.is_running() {
                tracing::warn!("tick thread stopped");
                break;
            }
            continue;
        };

        match event {
            LifeEvent::GenerationAdvanced {
                generation,
                population,
                births,
                deaths,
            } => {
                if generation % report_every == 0 {
                    tracing::info!(generation, population, births, deaths, "generation");
                    if render {
                        println!("{}", driver.with_engine(|engine| engine.render_ascii()));
                    }
                }
                if generations.is_some_and(|limit| generation >= limit) {
                    tracing::info!(generation, "generation limit reached");
                    break;
                }
            }
            LifeEvent::PoolExhausted {
                generation,
                overflow_live,
            } => {
                tracing::debug!(generation, overflow_live, "pool exhausted");
            }
            LifeEvent::Restarted {
                width,
                height,
                population,
            } => {
                tracing::info!(width, height, population, "restarted");
            }
            LifeEvent::Paused => tracing::info!("paused"),
            LifeEvent::Resumed => tracing::info!("resumed"),
        }
    }

    let counters = driver.counters();
    let pool = driver.pool_stats();
    tracing::info!(
        generation = counters.generation,
        population = counters.population,
        overflow_live = pool.overflow_live,
        exhaustion_events = pool.exhaustion_events,
        "final counters"
    );
    driver.shutdown();
    Ok(())
}
