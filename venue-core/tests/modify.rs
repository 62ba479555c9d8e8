//! No in-place order modification exists in this engine: a client that
//! wants to "modify" a resting order must cancel it and submit a
//! replacement. These tests exercise that workflow and confirm it behaves
//! exactly like any other cancel-then-order sequence: price-time priority
//! and the non-crossed invariant both hold across it.

mod common;

use common::*;
use venue_core::prelude::*;

fn engine() -> MatchingEngine<RecordingEventSink> {
    MatchingEngine::new(RecordingEventSink::default())
}

#[test]
fn cancel_then_replace_at_a_new_price_loses_old_time_priority() {
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Buy, 100.0, 1.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Buy, 100.0, 1.0, 1))
        .unwrap();

    // "Modify" #1 by canceling and resubmitting at a higher price.
    engine.process_cancel(1, Side::Buy);
    engine
        .process_order(make_limit_order(1, Side::Buy, 101.0, 1.0, 2))
        .unwrap();

    // #1 now leads the book on price, but within its own new level it is
    // the only resting order; #2 still leads at the old price level.
    assert_eq!(engine.book().best_price(Side::Buy), Some(101.0));
    assert_eq!(resting_ids(engine.book(), Side::Buy), vec![2, 1]);
}

#[test]
fn cancel_then_replace_at_a_crossing_price_trades_immediately() {
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Sell, 100.0, 1.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Buy, 90.0, 1.0, 1))
        .unwrap();

    engine.process_cancel(2, Side::Buy);
    engine
        .process_order(make_limit_order(2, Side::Buy, 100.0, 1.0, 2))
        .unwrap();

    assert_eq!(engine.sink().trades.len(), 1);
    assert!(engine.book().is_empty());
}

#[test]
fn partial_fill_then_cancel_leaves_only_the_residual_quantity_canceled() {
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Sell, 100.0, 2.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Buy, 100.0, 0.75, 1))
        .unwrap();

    engine.process_cancel(1, Side::Sell);

    let canceled = engine.sink().canceled[0];
    assert_eq!(canceled.filled_quantity, 0.75);
    assert_eq!(canceled.quantity, 2.0);
    assert_eq!(canceled.status, OrderStatus::PartiallyFilledCanceled);
}
