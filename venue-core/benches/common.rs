use chrono::{DateTime, Utc};
use venue_core::prelude::*;

fn timestamp(seq: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000 + seq as i64, 0).expect("in-range timestamp")
}

/// Builds a limit order for benchmark fixtures; `seq` stands in for arrival
/// order so generated flow keeps a deterministic FIFO ordering.
pub fn make_limit_order(id: u32, side: Side, price: f64, qty: f64, seq: u64) -> Order {
    let ts = timestamp(seq);
    Order {
        order_id: id,
        user_id: id as u64,
        price,
        quantity: qty,
        filled_quantity: 0.0,
        fee_rate: 0.001,
        side,
        order_type: OrderType::Limit,
        status: OrderStatus::Initial,
        create_time: ts,
        update_time: ts,
    }
}
