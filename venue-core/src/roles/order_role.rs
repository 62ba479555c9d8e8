use crate::config::DbConfig;
use crate::prelude::*;
use crate::store::Store;
use crate::transport;
use crate::wire::Envelope;
use anyhow::Context;
use chrono::Utc;
use rand::Rng;
use std::sync::atomic::{AtomicU32, Ordering};
use zmq::Socket;

const PRICE_RANGE: std::ops::Range<f64> = 90.0..110.0;
const QUANTITY_RANGE: std::ops::Range<f64> = 0.1..5.0;
const FEE_RATE_RANGE: std::ops::Range<f64> = 0.0..0.002;

/// Runs the order producer: replays every still-open order from the store,
/// then generates `count` synthetic orders, persisting and publishing each
/// one. Sampling ranges for synthetic mode are test-fixture behavior, not
/// part of the wire contract.
pub async fn run(db_config: DbConfig, order_sink_addr: &str, count: usize) -> anyhow::Result<()> {
    let store = Store::connect(&db_config).await?;
    let ctx = zmq::Context::new();
    let push = transport::connect_order_push(&ctx, order_sink_addr)?;

    let replay_candidates = store.replay_candidates().await?;
    tracing::info!(
        replayed = replay_candidates.len(),
        "replaying resting orders from store"
    );
    for order in replay_candidates {
        publish(&push, Envelope::Order(order));
    }

    if count == 0 {
        return Ok(());
    }

    let next_id = AtomicU32::new(store.max_order_id().await?.unwrap_or(0) + 1);
    tracing::info!(count, "generating synthetic orders");
    let mut rng = rand::rng();
    for _ in 0..count {
        let order_id = next_id.fetch_add(1, Ordering::Relaxed);
        let order = synthetic_order(order_id, &mut rng);
        store
            .insert_new_order(&order)
            .await
            .context("persisting synthetic order before publish")?;
        publish(&push, Envelope::Order(order));
    }

    Ok(())
}

/// Samples a brand-new `INITIAL` order with uniformly distributed price,
/// quantity, and fee rate.
fn synthetic_order(order_id: OrderID, rng: &mut impl Rng) -> Order {
    let now = Utc::now();
    let side = if rng.random_bool(0.5) { Side::Buy } else { Side::Sell };
    Order {
        order_id,
        user_id: rng.random_range(1..10_000),
        price: round_to_precision(rng.random_range(PRICE_RANGE), PRICE_PRECISION),
        quantity: round_to_precision(rng.random_range(QUANTITY_RANGE), QUANTITY_PRECISION),
        filled_quantity: 0.0,
        fee_rate: round_to_precision(rng.random_range(FEE_RATE_RANGE), FEE_PRECISION),
        side,
        order_type: OrderType::Limit,
        status: OrderStatus::Initial,
        create_time: now,
        update_time: now,
    }
}

fn publish(socket: &Socket, envelope: Envelope) {
    let wire = envelope.encode();
    if let Err(err) = socket.send(&wire, 0) {
        tracing::warn!(%err, "failed to publish order");
    }
}
