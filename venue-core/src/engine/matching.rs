use crate::prelude::*;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// MatchingEngine owns the resident book for one instrument and applies
/// incoming orders and cancels to it, emitting every side effect through an
/// `EventSink`.
pub struct MatchingEngine<S: EventSink> {
    book: DefaultOrderBook,
    sink: S,
    next_trade_id: AtomicU64,
}

impl<S: EventSink> MatchingEngine<S> {
    pub fn new(sink: S) -> Self {
        Self {
            book: DefaultOrderBook::new(),
            sink,
            next_trade_id: AtomicU64::new(1),
        }
    }

    pub fn book(&self) -> &DefaultOrderBook {
        &self.book
    }

    /// Gives tests access to whatever the sink recorded; production sinks
    /// (e.g. the zmq-backed one in the `match` role) have no need of this.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    fn next_trade_id(&self) -> u64 {
        self.next_trade_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Whether a resting order at `maker_price` on `maker_side` is
    /// marketable against a taker on the opposite side at `taker_price`.
    fn is_marketable(maker_side: Side, maker_price: f64, taker_price: f64) -> bool {
        match maker_side {
            // Maker is a resting ask; marketable when ask <= bid.
            Side::Sell => maker_price <= taker_price,
            // Maker is a resting bid; marketable when bid >= ask.
            Side::Buy => maker_price >= taker_price,
        }
    }

    /// Processes one incoming order: walks the opposite side, consuming
    /// marketable levels in FIFO order, then rests any residual quantity.
    ///
    /// Returns `Err` only for book-invariant violations; malformed input is
    /// rejected earlier, at the wire boundary, and never reaches here.
    pub fn process_order(&mut self, mut taker: Order) -> Result<(), EngineError> {
        let maker_side = taker.side.opposite();
        let now = Utc::now();
        let mut traded_any = false;

        'walk: loop {
            if taker.is_filled() {
                break;
            }
            let Some(level_price) = self.book.best_price(maker_side) else {
                break;
            };
            if !Self::is_marketable(maker_side, level_price, taker.price) {
                break;
            }
            let key = PriceKey(level_price);

            loop {
                if taker.is_filled() {
                    break 'walk;
                }
                let remove_maker = {
                    let Some(maker) = self.book.front_mut(maker_side, key) else {
                        break;
                    };
                    let trade_qty = round_to_precision(
                        taker.remaining().min(maker.remaining()),
                        QUANTITY_PRECISION,
                    );
                    if trade_qty <= 0.0 {
                        break;
                    }

                    let trade_price = maker.price;
                    maker.apply_fill(trade_qty, now);
                    taker.apply_fill(trade_qty, now);

                    let (buy_order, sell_order) = match taker.side {
                        Side::Buy => (&taker, &*maker),
                        Side::Sell => (&*maker, &taker),
                    };
                    let buyer_fee =
                        round_to_precision(buy_order.fee_rate * trade_qty * trade_price, FEE_PRECISION);
                    let seller_fee =
                        round_to_precision(sell_order.fee_rate * trade_qty * trade_price, FEE_PRECISION);
                    let trade = TradeRecord {
                        trade_id: self.next_trade_id(),
                        buyer_user_id: buy_order.user_id,
                        seller_user_id: sell_order.user_id,
                        buyer_order_id: buy_order.order_id,
                        seller_order_id: sell_order.order_id,
                        order_type: taker.side,
                        trade_price,
                        trade_quantity: trade_qty,
                        buyer_fee,
                        seller_fee,
                        trade_time: now,
                    };
                    traded_any = true;
                    self.sink.traded(&trade, buy_order, sell_order);

                    maker.is_filled()
                };

                if remove_maker {
                    self.book.pop_front(maker_side, key);
                } else {
                    // Partial fill: the maker stays at the front of its
                    // queue, keeping its original time priority.
                    break;
                }
            }
        }

        if !taker.is_filled() {
            if !traded_any {
                // No fill occurred on this aggressor pass: the taker moves
                // from INITIAL to MATCHING as it takes up residence on the
                // book, rather than staying in its pre-engine status.
                taker.status = OrderStatus::Matching;
                taker.update_time = now;
            }
            self.book.insert(taker);
        }
        if !traded_any {
            self.sink.unmatched(&taker);
        }
        self.sink.book_changed(&self.book);
        Ok(())
    }

    /// Removes a resting order by id and side, emitting a status update.
    /// A missing order (already filled, already canceled, or resting on the
    /// other side from the one named) is a silent no-op: the book is the
    /// source of truth.
    pub fn process_cancel(&mut self, order_id: OrderID, side: Side) {
        let Some(mut order) = self.book.remove(order_id, side) else {
            tracing::debug!(order_id, ?side, "cancel target not resting, ignored");
            return;
        };
        order.status = if order.filled_quantity > 0.0 {
            OrderStatus::PartiallyFilledCanceled
        } else {
            OrderStatus::Canceled
        };
        order.update_time = Utc::now();
        self.sink.canceled(&order);
        self.sink.book_changed(&self.book);
    }
}
