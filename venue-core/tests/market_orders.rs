//! MARKET orders are declared in the wire enum but never given auction-style
//! best-price handling: the engine matches every order, market or limit,
//! purely against its carried `price` field.

mod common;

use common::*;
use venue_core::prelude::*;

fn engine() -> MatchingEngine<RecordingEventSink> {
    MatchingEngine::new(RecordingEventSink::default())
}

fn make_market_order(id: OrderID, side: Side, price: f64, qty: f64, seq: i64) -> Order {
    Order {
        order_type: OrderType::Market,
        ..make_limit_order(id, side, price, qty, seq)
    }
}

#[test]
fn market_order_matches_exactly_like_a_limit_order_at_its_price() {
    let mut limit_engine = engine();
    limit_engine
        .process_order(make_limit_order(1, Side::Sell, 100.0, 1.0, 0))
        .unwrap();
    limit_engine
        .process_order(make_limit_order(2, Side::Buy, 100.0, 1.0, 1))
        .unwrap();

    let mut market_engine = engine();
    market_engine
        .process_order(make_limit_order(1, Side::Sell, 100.0, 1.0, 0))
        .unwrap();
    market_engine
        .process_order(make_market_order(2, Side::Buy, 100.0, 1.0, 1))
        .unwrap();

    assert_eq!(limit_engine.sink().trades.len(), market_engine.sink().trades.len());
    assert_eq!(
        limit_engine.sink().trades[0].trade_price,
        market_engine.sink().trades[0].trade_price
    );
    assert!(limit_engine.book().is_empty());
    assert!(market_engine.book().is_empty());
}

#[test]
fn market_order_rests_if_not_marketable_just_like_a_limit_order() {
    // Non-goal: no auction or implied-best-price behavior for MARKET. A
    // market order that does not cross at its own carried price rests,
    // exactly as a limit order would.
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Sell, 100.0, 1.0, 0))
        .unwrap();
    engine
        .process_order(make_market_order(2, Side::Buy, 50.0, 1.0, 1))
        .unwrap();

    assert!(engine.sink().trades.is_empty());
    assert_eq!(resting_ids(engine.book(), Side::Buy), vec![2]);
}
