use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// OrderID is the type used for order IDs.
pub type OrderID = u32;

/// Side indicates the direction of an order, and doubles as the taker side
/// recorded on a `TradeRecord` and the book side queried for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The opposite side, used to pick the book a taker walks.
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    /// The column value stored for this side in the persistent schema.
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }

    /// Parses a stored side column back into a `Side`.
    pub fn parse(raw: &str) -> Option<Side> {
        match raw {
            "BUY" => Some(Side::Buy),
            "SELL" => Some(Side::Sell),
            _ => None,
        }
    }
}

/// OrderType determines how the order will be executed.
///
/// A `Market` order walks the opposite book the same way a `Limit` order
/// does; it is not given auction-style best-price semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
    Market,
}

impl OrderType {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
            OrderType::Market => "MARKET",
        }
    }

    pub fn parse(raw: &str) -> Option<OrderType> {
        match raw {
            "LIMIT" => Some(OrderType::Limit),
            "MARKET" => Some(OrderType::Market),
            _ => None,
        }
    }
}

/// OrderStatus represents the current status of an order during its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Initial,
    Matching,
    PartiallyFilled,
    FullyFilled,
    Canceled,
    PartiallyFilledCanceled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Initial => "INITIAL",
            OrderStatus::Matching => "MATCHING",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::FullyFilled => "FULLY_FILLED",
            OrderStatus::Canceled => "CANCELED",
            OrderStatus::PartiallyFilledCanceled => "PARTIALLY_FILLED_CANCELED",
        }
    }

    pub fn parse(raw: &str) -> Option<OrderStatus> {
        match raw {
            "INITIAL" => Some(OrderStatus::Initial),
            "MATCHING" => Some(OrderStatus::Matching),
            "PARTIALLY_FILLED" => Some(OrderStatus::PartiallyFilled),
            "FULLY_FILLED" => Some(OrderStatus::FullyFilled),
            "CANCELED" => Some(OrderStatus::Canceled),
            "PARTIALLY_FILLED_CANCELED" => Some(OrderStatus::PartiallyFilledCanceled),
            _ => None,
        }
    }

    /// Orders still eligible for replay at startup: not yet in a terminal
    /// state.
    pub fn is_replayable(self) -> bool {
        matches!(
            self,
            OrderStatus::Initial | OrderStatus::Matching | OrderStatus::PartiallyFilled
        )
    }
}

/// Precision, in fractional digits, applied at each monetary value's
/// well-defined rounding boundary.
pub const PRICE_PRECISION: i32 = 8;
pub const QUANTITY_PRECISION: i32 = 6;
pub const FEE_PRECISION: i32 = 6;

/// Residual quantity below this is treated as fully filled, to avoid
/// resting dust positions caused by binary64 rounding.
pub const DUST_EPSILON: f64 = 1e-6;

/// Rounds `value` to `precision` fractional digits, half-up on the
/// scaled value.
#[inline]
pub fn round_to_precision(value: f64, precision: i32) -> f64 {
    let factor = 10f64.powi(precision);
    (value * factor).round() / factor
}

/// True when a resting/remaining quantity is close enough to zero to be
/// treated as fully filled.
#[inline]
pub fn is_dust(remaining: f64) -> bool {
    remaining.abs() < DUST_EPSILON
}

/// A price wrapper giving `f64` a total order for use as a `BTreeMap` key.
///
/// Prices reaching the book have already been validated finite (non-finite
/// prices are rejected at the wire boundary), so `f64::total_cmp` gives
/// exactly the ordering we need without pulling in an external
/// ordered-float crate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceKey(pub f64);

impl Eq for PriceKey {}

impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `Order` is a single resting or in-flight order.
///
/// Fields mirror the wire representation field for field; there is no
/// separate "domain" vs "wire" struct because the two never diverge in
/// this engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Order {
    pub order_id: OrderID,
    pub user_id: u64,
    pub price: f64,
    pub quantity: f64,
    pub filled_quantity: f64,
    pub fee_rate: f64,
    pub side: Side,
    pub order_type: OrderType,
    pub status: OrderStatus,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
}

impl Order {
    /// Unfilled quantity remaining on this order.
    #[inline]
    pub fn remaining(&self) -> f64 {
        self.quantity - self.filled_quantity
    }

    /// An order never rests once its remaining quantity is dust.
    #[inline]
    pub fn is_filled(&self) -> bool {
        is_dust(self.remaining())
    }

    /// Applies a fill of `traded` quantity, rounding `filled_quantity` to
    /// its wire precision, and advances `status` accordingly. Returns the
    /// order's own remaining quantity after the fill.
    pub(crate) fn apply_fill(&mut self, traded: f64, now: DateTime<Utc>) -> f64 {
        self.filled_quantity = round_to_precision(self.filled_quantity + traded, QUANTITY_PRECISION);
        self.update_time = now;
        self.status = if self.is_filled() {
            OrderStatus::FullyFilled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.remaining()
    }
}

/// `TradeRecord` is an immutable record of one fill between a buyer and a
/// seller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeRecord {
    pub trade_id: u64,
    pub buyer_user_id: u64,
    pub seller_user_id: u64,
    pub buyer_order_id: OrderID,
    pub seller_order_id: OrderID,
    /// The taker's side at the moment of the trade.
    pub order_type: Side,
    pub trade_price: f64,
    pub trade_quantity: f64,
    pub buyer_fee: f64,
    pub seller_fee: f64,
    pub trade_time: DateTime<Utc>,
}
