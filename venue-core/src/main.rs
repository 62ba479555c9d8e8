use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use venue_core::roles::{heal_role, kline_role, match_role, order_role, persis_role};
use venue_core::{config, logging};

const CONFIG_PATH: &str = "config.json";
const ORDER_SINK_ADDR: &str = "tcp://127.0.0.1:12345";
const EVENT_SOURCE_ADDR: &str = "tcp://127.0.0.1:12346";
const SNAPSHOT_SOURCE_ADDR: &str = "tcp://127.0.0.1:12347";

/// One binary, five roles, selected by a positional subcommand.
#[derive(Parser)]
#[command(name = "venue", about = "Limit order matching engine and its satellite roles")]
struct Cli {
    #[command(subcommand)]
    role: Role,
}

#[derive(Subcommand)]
enum Role {
    /// Runs the matching engine's synchronous receive loop.
    Match,
    /// Applies the engine's trade and status events to the store.
    Persis,
    /// Replays resting orders and generates synthetic order flow.
    Order {
        /// Number of synthetic orders to generate after replay.
        #[arg(long, default_value_t = 0)]
        count: usize,
    },
    /// Serves the latest book snapshot over HTTP and broadcasts it to websocket clients.
    Heal,
    /// Aggregates persisted trades into OHLCV candles.
    Kline {
        /// Candle width, in seconds.
        #[arg(long, default_value_t = 60)]
        interval: i64,
    },
}

fn main() -> anyhow::Result<()> {
    logging::init();
    let cli = Cli::parse();

    match cli.role {
        Role::Match => match_role::run(),
        Role::Persis => {
            let db_config = load_config()?;
            tokio_runtime()?.block_on(persis_role::run(db_config, EVENT_SOURCE_ADDR))
        }
        Role::Order { count } => {
            let db_config = load_config()?;
            tokio_runtime()?.block_on(order_role::run(db_config, ORDER_SINK_ADDR, count))
        }
        Role::Heal => {
            // The fanout has no database of its own; it still reads
            // config.json at startup for consistency with the other roles.
            let _ = load_config()?;
            tokio_runtime()?.block_on(heal_role::run(SNAPSHOT_SOURCE_ADDR))
        }
        Role::Kline { interval } => {
            let db_config = load_config()?;
            let since = epoch_start();
            tokio_runtime()?.block_on(kline_role::run(db_config, interval, since))
        }
    }
}

/// Default start of the aggregation window: the kline role has no
/// `--since` flag, so it aggregates every trade on record.
fn epoch_start() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).expect("unix epoch is representable")
}

fn load_config() -> anyhow::Result<config::DbConfig> {
    config::load_db_config(&PathBuf::from(CONFIG_PATH)).context("loading config.json")
}

fn tokio_runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building async runtime")
}
