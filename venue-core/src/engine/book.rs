use crate::prelude::*;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// OrderBook is a trait for a single-instrument limit order book.
///
/// Implementations are not required to be thread-safe: the matching engine
/// that owns a book is the only writer, and is itself run from a single
/// thread.
pub trait OrderBook {
    /// Inserts a resting order into the book, at the back of its price
    /// level's queue.
    fn insert(&mut self, order: Order);

    /// Removes and returns the order with the given id, wherever it sits in
    /// its level's queue. Returns `None` if the order is not resting on
    /// `side` (it may already have been fully filled or canceled, or it may
    /// be resting on the other side entirely — a mismatch is a no-op, not a
    /// cross-side removal).
    fn remove(&mut self, order_id: OrderID, side: Side) -> Option<Order>;

    /// Returns the best (most aggressive) price resting on `side`, if any.
    fn best_price(&self, side: Side) -> Option<f64>;

    /// Returns a mutable reference to the order at the front of the given
    /// price level's queue.
    fn front_mut(&mut self, side: Side, price: PriceKey) -> Option<&mut Order>;

    /// Pops the order at the front of the given price level's queue,
    /// dropping the level entirely once it empties.
    fn pop_front(&mut self, side: Side, price: PriceKey) -> Option<Order>;

    /// Iterates price levels on `side` in the order a taker on the opposite
    /// side would walk them: best price first.
    fn walk(&self, side: Side) -> Box<dyn Iterator<Item = (&PriceKey, &VecDeque<Order>)> + '_>;

    /// Iterates all resting orders on both sides in ascending price order,
    /// for snapshot rendering.
    fn snapshot_side(&self, side: Side) -> Box<dyn Iterator<Item = (&PriceKey, &VecDeque<Order>)> + '_>;

    /// True if neither side has any resting orders.
    fn is_empty(&self) -> bool;
}

/// DefaultOrderBook keeps each side as a price-ordered map of FIFO queues: a
/// `BTreeMap<PriceKey, VecDeque<Order>>` per side, plus an id index for O(1)
/// cancel lookups. This follows directly from the ordered-map-plus-queue
/// layout called out for a single-threaded book.
#[derive(Default)]
pub struct DefaultOrderBook {
    bids: BTreeMap<PriceKey, VecDeque<Order>>,
    asks: BTreeMap<PriceKey, VecDeque<Order>>,
    index: HashMap<OrderID, (Side, PriceKey)>,
}

impl DefaultOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    fn side_map(&self, side: Side) -> &BTreeMap<PriceKey, VecDeque<Order>> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_map_mut(&mut self, side: Side) -> &mut BTreeMap<PriceKey, VecDeque<Order>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }
}

impl OrderBook for DefaultOrderBook {
    fn insert(&mut self, order: Order) {
        let key = PriceKey(order.price);
        let side = order.side;
        self.index.insert(order.order_id, (side, key));
        self.side_map_mut(side).entry(key).or_default().push_back(order);
    }

    fn remove(&mut self, order_id: OrderID, side: Side) -> Option<Order> {
        let &(resting_side, key) = self.index.get(&order_id)?;
        if resting_side != side {
            return None;
        }
        self.index.remove(&order_id);
        let map = self.side_map_mut(side);
        let level = map.get_mut(&key)?;
        let pos = level.iter().position(|o| o.order_id == order_id)?;
        let order = level.remove(pos);
        if level.is_empty() {
            map.remove(&key);
        }
        order
    }

    fn best_price(&self, side: Side) -> Option<f64> {
        let map = self.side_map(side);
        match side {
            Side::Buy => map.keys().next_back().map(|k| k.0),
            Side::Sell => map.keys().next().map(|k| k.0),
        }
    }

    fn front_mut(&mut self, side: Side, price: PriceKey) -> Option<&mut Order> {
        self.side_map_mut(side).get_mut(&price)?.front_mut()
    }

    fn pop_front(&mut self, side: Side, price: PriceKey) -> Option<Order> {
        let map = self.side_map_mut(side);
        let level = map.get_mut(&price)?;
        let order = level.pop_front()?;
        if level.is_empty() {
            map.remove(&price);
        }
        self.index.remove(&order.order_id);
        Some(order)
    }

    fn walk(&self, side: Side) -> Box<dyn Iterator<Item = (&PriceKey, &VecDeque<Order>)> + '_> {
        match side {
            // A buy taker walks resting sell levels cheapest-first.
            Side::Buy => Box::new(self.asks.iter()),
            // A sell taker walks resting buy levels richest-first.
            Side::Sell => Box::new(self.bids.iter().rev()),
        }
    }

    fn snapshot_side(&self, side: Side) -> Box<dyn Iterator<Item = (&PriceKey, &VecDeque<Order>)> + '_> {
        Box::new(self.side_map(side).iter())
    }

    fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}
