//! Forkring CLI.
//!
//! Seats the philosophers, narrates the session through `tracing`, optionally
//! appends every state change to a file, and exits when the food runs out or
//! on Ctrl-C.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use forkring::{BackoffPolicy, Config, FileLog, Interval, LogWriter, Subscribe, Table};

#[derive(Parser)]
#[command(name = "forkring")]
#[command(about = "Dining philosophers around a ring of forks")]
struct Cli {
    /// Philosophers (and forks) around the table
    #[arg(long, env = "FORKRING_SEATS", default_value = "11")]
    seats: usize,

    /// Portions of food for the whole session
    #[arg(long, env = "FORKRING_FOOD", default_value = "43")]
    food: u64,

    /// Longest meal, in milliseconds
    #[arg(long, default_value = "4000")]
    eat_ms: u64,

    /// Longest thinking phase, in milliseconds
    #[arg(long, default_value = "10000")]
    think_ms: u64,

    /// Delay between attempts to pick up busy forks, in milliseconds
    #[arg(long, default_value = "100")]
    retry_ms: u64,

    /// How long to wait for philosophers to leave on shutdown, in milliseconds
    #[arg(long, default_value = "5000")]
    grace_ms: u64,

    /// Append "Philosopher #N: is <state>" lines to this file (truncated first)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Pause every philosopher after this many milliseconds
    #[arg(long)]
    pause_after_ms: Option<u64>,

    /// Resume after a pause of this many milliseconds
    #[arg(long, default_value = "2000")]
    pause_for_ms: u64,

    /// Enable verbose output
    #[arg(long, short)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            seats: self.seats,
            food: self.food,
            retry: BackoffPolicy::constant(Duration::from_millis(self.retry_ms)),
            eat: Interval::up_to(Duration::from_millis(self.eat_ms)),
            think: Interval::up_to(Duration::from_millis(self.think_ms)),
            grace: Duration::from_millis(self.grace_ms),
            ..Config::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("forkring=debug")
        } else {
            EnvFilter::new("forkring=info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    if let Some(path) = &cli.log_file {
        let log = FileLog::create(path)
            .await
            .with_context(|| format!("cannot open log file {}", path.display()))?;
        subs.push(Arc::new(log));
    }

    let table = Table::builder(cli.config())
        .with_subscribers(subs)
        .build()
        .context("invalid table configuration")?;

    if let Some(after) = cli.pause_after_ms {
        let table = Arc::clone(&table);
        let pause_for = Duration::from_millis(cli.pause_for_ms);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(after)).await;
            info!(paused = table.pause_all(), "pausing the table");
            tokio::time::sleep(pause_for).await;
            info!(resumed = table.resume_all(), "resuming the table");
        });
    }

    let outcome = table.run().await?;
    info!(
        reason = ?outcome.reason,
        meals = outcome.meals,
        food_left = outcome.food_left,
        "the table is cleared"
    );
    Ok(())
}
