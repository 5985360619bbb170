//! LruCache demo - sample scenarios driving the public cache API

mod scenarios;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;

use crate::scenarios::ThreadsConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Scenario {
    /// Insert, promote and evict on a three-entry cache
    Basic,
    /// Memoize simulated API responses
    Api,
    /// Byte-buffer cache overflowing its capacity
    Images,
    /// Random lookups and the resulting hit rate
    Stats,
    /// Parallel writers and readers on disjoint keys
    Threads,
    /// Run every scenario in order
    All,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario to run
    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    scenario: Scenario,

    /// Worker threads for the threads scenario
    #[arg(short, long, default_value_t = 5)]
    threads: u64,

    /// Put/get pairs per worker thread
    #[arg(short, long, default_value_t = 20)]
    ops: u64,

    /// Cache capacity for the threads scenario
    #[arg(short, long, default_value_t = 100)]
    capacity: usize,

    /// RNG seed for the stats scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Print statistics as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Starting lru-demo v{}", env!("CARGO_PKG_VERSION"));

    let threads = ThreadsConfig {
        threads: args.threads,
        ops: args.ops,
        capacity: args.capacity,
    };

    match args.scenario {
        Scenario::Basic => scenarios::basic()?,
        Scenario::Api => scenarios::api_responses()?,
        Scenario::Images => scenarios::images()?,
        Scenario::Stats => scenarios::statistics(args.seed, args.json)?,
        Scenario::Threads => scenarios::threads(&threads, args.json)?,
        Scenario::All => {
            scenarios::basic()?;
            scenarios::api_responses()?;
            scenarios::images()?;
            scenarios::statistics(args.seed, args.json)?;
            scenarios::threads(&threads, args.json)?;
        }
    }

    info!("Done");
    Ok(())
}
