use crate::config::DbConfig;
use crate::prelude::*;
use crate::store::Store;
use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct Candle {
    #[serde(rename = "bucketStart")]
    bucket_start: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Runs the kline aggregation role: buckets persisted trades into
/// fixed-width candles and prints one JSON line per candle to stdout.
/// Read-only against the store; never touches the book.
pub async fn run(db_config: DbConfig, interval_secs: i64, since: DateTime<Utc>) -> anyhow::Result<()> {
    let store = Store::connect(&db_config).await?;
    let trades = store.trades_since(since).await?;

    let mut buckets: BTreeMap<i64, Vec<&TradeRecord>> = BTreeMap::new();
    for trade in &trades {
        let bucket = trade.trade_time.timestamp().div_euclid(interval_secs);
        buckets.entry(bucket).or_default().push(trade);
    }

    tracing::info!(
        candles = buckets.len(),
        trades = trades.len(),
        interval_secs,
        "aggregating trades into candles"
    );

    for (bucket, bucket_trades) in buckets {
        let bucket_start = Utc
            .timestamp_opt(bucket * interval_secs, 0)
            .single()
            .context("candle bucket start out of range")?;
        // bucket_trades preserves `trades`'s trade-time ascending order.
        let open = bucket_trades.first().expect("non-empty bucket").trade_price;
        let close = bucket_trades.last().expect("non-empty bucket").trade_price;
        let high = bucket_trades
            .iter()
            .map(|t| t.trade_price)
            .fold(f64::MIN, f64::max);
        let low = bucket_trades
            .iter()
            .map(|t| t.trade_price)
            .fold(f64::MAX, f64::min);
        let volume = bucket_trades.iter().map(|t| t.trade_quantity).sum();

        let candle = Candle {
            bucket_start,
            open,
            high,
            low,
            close,
            volume,
        };
        println!("{}", serde_json::to_string(&candle).context("encoding candle")?);
    }

    Ok(())
}
