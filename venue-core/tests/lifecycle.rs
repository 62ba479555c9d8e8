//! Order status transitions across the engine-visible state machine:
//! monotone fills, fill conservation, and no order resting once filled.

mod common;

use common::*;
use venue_core::prelude::*;

fn engine() -> MatchingEngine<RecordingEventSink> {
    MatchingEngine::new(RecordingEventSink::default())
}

#[test]
fn unmatched_order_transitions_from_initial_to_matching_at_rest() {
    // An aggressor that trades zero quantity on its pass and rests moves
    // INITIAL -> MATCHING, per the engine-visible state machine.
    let mut engine = engine();
    let order = make_limit_order(1, Side::Buy, 100.0, 1.0, 0);
    assert_eq!(order.status, OrderStatus::Initial);
    engine.process_order(order).unwrap();

    assert_eq!(engine.sink().unmatched[0].status, OrderStatus::Matching);
    assert_eq!(
        resting_ids(engine.book(), Side::Buy)
            .into_iter()
            .next()
            .unwrap(),
        1
    );
}

#[test]
fn full_fill_transitions_to_fully_filled() {
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Buy, 100.0, 1.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Sell, 100.0, 1.0, 1))
        .unwrap();

    let trade = engine.sink().trades[0];
    assert_eq!(trade.trade_quantity, 1.0);
    assert!(engine.book().is_empty());
}

#[test]
fn partial_fill_transitions_to_partially_filled_and_rests() {
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Buy, 100.0, 2.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Sell, 100.0, 0.5, 1))
        .unwrap();

    let resting = resting_ids(engine.book(), Side::Buy);
    assert_eq!(resting, vec![1]);
}

#[test]
fn filled_quantity_is_monotonic_across_successive_fills() {
    // filledQuantity never decreases across events touching one order.
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Sell, 100.0, 3.0, 0))
        .unwrap();

    let mut last_filled = 0.0;
    for (seq, qty) in [(1, 1.0), (2, 0.5), (3, 1.5)] {
        engine
            .process_order(make_limit_order(100 + seq, Side::Buy, 100.0, qty, seq))
            .unwrap();
        let trades = &engine.sink().trades;
        if let Some(trade) = trades.last() {
            assert!(trade.trade_quantity > 0.0);
        }
        let filled: f64 = trades.iter().map(|t| t.trade_quantity).sum();
        assert!(filled >= last_filled);
        last_filled = filled;
    }
    assert!(engine.book().is_empty());
}

#[test]
fn trade_quantities_sum_to_each_orders_final_filled_quantity() {
    // Sum of trade quantities for an order equals its final filledQuantity.
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Sell, 100.0, 3.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Buy, 100.0, 1.0, 1))
        .unwrap();
    engine
        .process_order(make_limit_order(3, Side::Buy, 100.0, 2.0, 2))
        .unwrap();

    let filled_against_1: f64 = engine
        .sink()
        .trades
        .iter()
        .filter(|t| t.seller_order_id == 1)
        .map(|t| t.trade_quantity)
        .sum();
    assert_eq!(filled_against_1, 3.0);
    assert!(engine.book().is_empty());
}

#[test]
fn no_order_rests_once_fully_filled() {
    // The book never holds an order with filledQuantity >= quantity.
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Buy, 100.0, 1.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Sell, 100.0, 1.0, 1))
        .unwrap();

    for side in [Side::Buy, Side::Sell] {
        for (_, level) in engine.book().snapshot_side(side) {
            for order in level {
                assert!(order.remaining() > 0.0);
            }
        }
    }
}

#[test]
fn dust_residual_is_treated_as_fully_filled() {
    let mut order = make_limit_order(1, Side::Buy, 100.0, 1.0, 0);
    order.filled_quantity = 1.0 - 0.0000005;
    assert!(order.is_filled());
}
