use chrono::{DateTime, Utc};
use venue_core::prelude::*;

/// Builds a simple limit order with the given identity, side, price, and
/// quantity, stamped with `seq` converted to a monotone `createTime` so
/// tests can express FIFO ordering with plain integers.
pub fn make_limit_order(id: OrderID, side: Side, price: f64, qty: f64, seq: i64) -> Order {
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

/// As `make_limit_order`, but with an explicit fee rate.
pub fn make_limit_order_with_fee(id: OrderID, side: Side, price: f64, qty: f64, seq: i64, fee_rate: f64) -> Order {
    Order {
        fee_rate,
        ..make_limit_order(id, side, price, qty, seq)
    }
}

/// Converts a small integer sequence number into a distinct UTC instant, so
/// test fixtures can assert `createTime` ordering without depending on wall
/// clock resolution.
pub fn timestamp(seq: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000 + seq, 0).expect("in-range timestamp")
}

/// Snapshot of one side of the book, in walk order, as `(orderId,
/// remaining)` pairs — enough to assert price-time priority without
/// exposing the book's internal structure to tests.
pub fn resting_ids(book: &DefaultOrderBook, side: Side) -> Vec<OrderID> {
    book.snapshot_side(side)
        .flat_map(|(_, level)| level.iter())
        .map(|order| order.order_id)
        .collect()
}
