//! ByteBrew Simulator CLI
//!
//! Runs a session of random orders against one eviction policy (or all three
//! on the same order stream with `--compare`) and prints the final snapshot
//! with impact estimates as JSON.
//!
//! ```text
//! bytebrew --orders 20 --policy lfu --hit-ms 20 --miss-ms 40 --seed 7
//! bytebrew --compare --capacity 2 --orders 50 --hit-ms 1 --miss-ms 2
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bytebrew::adapters::{CompositeEventSink, InMemoryEventCollector, LoggingEventSink};
use bytebrew::impact::{estimate, ImpactParams, ImpactReport};
use bytebrew::{EvictionPolicy, SimulationConfig, SimulationController, SimulationSnapshot};

// =============================================================================
// CLI Arguments
// =============================================================================

/// ByteBrew - coffee shop cache eviction simulator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "BYTEBREW_CONFIG")]
    config: Option<PathBuf>,

    /// Cache capacity (overrides the config file)
    #[arg(long, env = "BYTEBREW_CAPACITY")]
    capacity: Option<usize>,

    /// Eviction policy: lru, fifo or lfu (overrides the config file)
    #[arg(long, env = "BYTEBREW_POLICY")]
    policy: Option<EvictionPolicy>,

    /// Number of random orders to run
    #[arg(long, env = "BYTEBREW_ORDERS", default_value = "10")]
    orders: usize,

    /// Seed for order selection
    #[arg(long, env = "BYTEBREW_SEED")]
    seed: Option<u64>,

    /// Preparation time of a cache hit in milliseconds
    #[arg(long, env = "BYTEBREW_HIT_MS")]
    hit_ms: Option<u64>,

    /// Preparation time of a cache miss in milliseconds
    #[arg(long, env = "BYTEBREW_MISS_MS")]
    miss_ms: Option<u64>,

    /// Run every policy on the same order stream
    #[arg(long)]
    compare: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    /// File (or default) configuration with command-line overrides applied
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => SimulationConfig::default(),
        };

        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(hit_ms) = self.hit_ms {
            config.hit_duration_ms = hit_ms;
        }
        if let Some(miss_ms) = self.miss_ms {
            config.miss_duration_ms = miss_ms;
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

// =============================================================================
// Report
// =============================================================================

/// Outcome of one session
#[derive(Debug, Serialize)]
struct RunReport {
    policy: EvictionPolicy,
    seed: u64,
    events_published: usize,
    snapshot: SimulationSnapshot,
    impact: ImpactReport,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(&args);

    let mut config = args.simulation_config()?;
    // Every compared policy must see the same orders
    let seed = *config.seed.get_or_insert_with(rand::random);

    info!("Starting ByteBrew simulation");
    info!("  Capacity: {}", config.capacity);
    info!("  Orders: {}", args.orders);
    info!("  Seed: {}", seed);
    info!(
        "  Timings: hit {}ms, miss {}ms",
        config.hit_duration_ms, config.miss_duration_ms
    );

    let policies: Vec<EvictionPolicy> = if args.compare {
        EvictionPolicy::ALL.to_vec()
    } else {
        vec![config.policy]
    };

    let mut reports = Vec::with_capacity(policies.len());
    for policy in policies {
        let report = run_session(config.clone().with_policy(policy), args.orders)
            .await
            .with_context(|| format!("running {} session", policy))?;
        reports.push(report);
    }

    let output = if reports.len() == 1 {
        serde_json::to_string_pretty(&reports[0])?
    } else {
        serde_json::to_string_pretty(&reports)?
    };
    println!("{}", output);

    Ok(())
}

async fn run_session(config: SimulationConfig, orders: usize) -> Result<RunReport> {
    let policy = config.policy;
    let seed = config.seed.unwrap_or_default();
    let budget = Duration::from_millis(config.miss_duration_ms.saturating_mul(2));

    let collector = Arc::new(InMemoryEventCollector::new());
    let sink = CompositeEventSink::new()
        .with_sink(LoggingEventSink::debug_level())
        .with_sink(collector.clone());
    let sim = SimulationController::new(config, Arc::new(sink))?;

    info!(policy = %policy, label = policy.label(), "Session started");
    for _ in 0..orders {
        if sim.submit_random_order().is_none() {
            warn!("Counter busy, order skipped");
        }
        tokio::time::timeout(budget, sim.wait_idle())
            .await
            .context("order did not complete in time")?;
    }

    let snapshot = sim.snapshot();
    let hit_rate = snapshot.statistics.for_policy(policy).hit_rate;
    info!(
        policy = %policy,
        hit_rate = %format!("{:.2}%", hit_rate),
        evictions = snapshot.eviction_count,
        "Session finished"
    );

    Ok(RunReport {
        policy,
        seed,
        events_published: collector.len(),
        impact: estimate(&ImpactParams::default().with_hit_rate(hit_rate))?,
        snapshot,
    })
}

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // Logs go to stderr so stdout stays valid JSON
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
