use crate::prelude::*;
use std::fmt::Write as _;

const HEADER: &str = "SIDE  PRICE             QUANTITY";
const SEPARATOR: &str = "------------------------------------";

/// Renders a plain-text order book snapshot: a header, a 36-dash separator,
/// then one row per resting order, bids first in ascending-price order,
/// then asks in ascending-price order.
///
/// Downstream consumers (market-data fanout) treat this as opaque bytes;
/// the format exists for human and health-check consumption only.
pub fn render_snapshot(book: &DefaultOrderBook) -> String {
    let mut out = String::new();
    out.push_str(HEADER);
    out.push('\n');
    out.push_str(SEPARATOR);
    out.push('\n');

    for (price, level) in book.snapshot_side(Side::Buy) {
        for order in level {
            let _ = writeln!(out, "BUY   {:>16.8}  {:>16.8}", price.0, order.quantity);
        }
    }
    for (price, level) in book.snapshot_side(Side::Sell) {
        for order in level {
            let _ = writeln!(out, "SELL  {:>16.8}  {:>16.8}", price.0, order.quantity);
        }
    }

    out
}
