//! The CANCEL envelope and `process_cancel`.

mod common;

use common::*;
use venue_core::prelude::*;
use venue_core::wire::Envelope;

fn engine() -> MatchingEngine<RecordingEventSink> {
    MatchingEngine::new(RecordingEventSink::default())
}

#[test]
fn scenario_7_cancel_of_resting_order_empties_its_level() {
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Buy, 100.0, 1.0, 0))
        .unwrap();

    engine.process_cancel(1, Side::Buy);

    assert_eq!(engine.sink().canceled.len(), 1);
    assert_eq!(engine.sink().canceled[0].status, OrderStatus::Canceled);
    assert!(engine.book().is_empty());
}

#[test]
fn cancel_of_partially_filled_order_reports_partial_cancel_status() {
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Buy, 100.0, 2.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Sell, 100.0, 0.5, 1))
        .unwrap();

    engine.process_cancel(1, Side::Buy);

    assert_eq!(
        engine.sink().canceled[0].status,
        OrderStatus::PartiallyFilledCanceled
    );
    assert!(engine.book().is_empty());
}

#[test]
fn cancel_racing_a_fill_is_a_silent_no_op() {
    // An order already removed by a fill is not an error to cancel again.
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Buy, 100.0, 1.0, 0))
        .unwrap();
    engine
        .process_order(make_limit_order(2, Side::Sell, 100.0, 1.0, 1))
        .unwrap();

    engine.process_cancel(1, Side::Buy);

    assert!(engine.sink().canceled.is_empty());
}

#[test]
fn cancel_of_unknown_order_is_a_silent_no_op() {
    let mut engine = engine();
    engine.process_cancel(404, Side::Sell);
    assert!(engine.sink().canceled.is_empty());
}

#[test]
fn cancel_on_the_wrong_side_does_not_remove_the_order() {
    let mut engine = engine();
    engine
        .process_order(make_limit_order(1, Side::Buy, 100.0, 1.0, 0))
        .unwrap();

    engine.process_cancel(1, Side::Sell);

    assert!(engine.sink().canceled.is_empty());
    assert_eq!(resting_ids(engine.book(), Side::Buy), vec![1]);
}

#[test]
fn cancel_envelope_is_plain_nested_json_not_double_encoded() {
    let envelope = Envelope::Cancel {
        order_id: 7,
        side: Side::Sell,
    };
    let wire = envelope.encode();
    let decoded = Envelope::decode(wire.as_bytes()).unwrap();
    match decoded {
        Envelope::Cancel { order_id, side } => {
            assert_eq!(order_id, 7);
            assert_eq!(side, Side::Sell);
        }
        other => panic!("expected Cancel, got {other:?}"),
    }
}
