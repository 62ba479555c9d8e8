use crate::prelude::*;

/// EventSink receives the side effects of matching: new orders resting
/// unmatched, trades, and cancellations. The engine calls it synchronously
/// from inside the match loop, so an implementation must not block on
/// anything slower than a non-blocking socket send.
pub trait EventSink: Send {
    /// A taker order rested on the book with no remaining trade against it.
    fn unmatched(&mut self, order: &Order);

    /// One fill between a resting maker and an incoming taker.
    fn traded(&mut self, trade: &TradeRecord, buy_order: &Order, sell_order: &Order);

    /// An order left the book via cancellation rather than a fill.
    fn canceled(&mut self, order: &Order);

    /// The book state changed; called once per processed order or cancel so
    /// the sink can decide, on its own cadence, whether to publish a
    /// snapshot.
    fn book_changed(&mut self, book: &DefaultOrderBook);
}

/// NullEventSink discards every event. Useful for benchmarks and unit tests
/// that only care about book state, not the emitted wire traffic.
#[derive(Default)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn unmatched(&mut self, _order: &Order) {}
    fn traded(&mut self, _trade: &TradeRecord, _buy_order: &Order, _sell_order: &Order) {}
    fn canceled(&mut self, _order: &Order) {}
    fn book_changed(&mut self, _book: &DefaultOrderBook) {}
}

/// RecordingEventSink collects every event in arrival order, for assertions
/// in tests that need to inspect exactly what the engine emitted.
#[derive(Default)]
pub struct RecordingEventSink {
    pub unmatched: Vec<Order>,
    pub trades: Vec<TradeRecord>,
    pub canceled: Vec<Order>,
    pub book_changes: usize,
}

impl EventSink for RecordingEventSink {
    fn unmatched(&mut self, order: &Order) {
        self.unmatched.push(*order);
    }

    fn traded(&mut self, trade: &TradeRecord, _buy_order: &Order, _sell_order: &Order) {
        self.trades.push(*trade);
    }

    fn canceled(&mut self, order: &Order) {
        self.canceled.push(*order);
    }

    fn book_changed(&mut self, _book: &DefaultOrderBook) {
        self.book_changes += 1;
    }
}
