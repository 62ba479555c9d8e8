use crate::prelude::*;
use crate::wire::error::EnvelopeError;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Formats and parses timestamps at the wire's second resolution
/// (`YYYY-MM-DDTHH:MM:SSZ`), matching the source stream's `strftime`
/// truncation even though the engine's own clock carries millisecond
/// resolution internally.
mod timestamp {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        let naive = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%SZ")
            .map_err(serde::de::Error::custom)?;
        Ok(Utc.from_utc_datetime(&naive))
    }
}

#[derive(Serialize, Deserialize)]
struct OrderWire {
    #[serde(rename = "orderId")]
    order_id: OrderID,
    #[serde(rename = "userId")]
    user_id: u64,
    price: f64,
    quantity: f64,
    #[serde(rename = "feeRate")]
    fee_rate: f64,
    #[serde(rename = "filledQuantity")]
    filled_quantity: f64,
    #[serde(rename = "orderSide")]
    order_side: Side,
    #[serde(rename = "orderType")]
    order_type: OrderType,
    status: OrderStatus,
    #[serde(rename = "createTime", with = "timestamp")]
    create_time: DateTime<Utc>,
    #[serde(rename = "updateTime", with = "timestamp")]
    update_time: DateTime<Utc>,
}

impl From<&Order> for OrderWire {
    fn from(o: &Order) -> Self {
        Self {
            order_id: o.order_id,
            user_id: o.user_id,
            price: o.price,
            quantity: o.quantity,
            fee_rate: o.fee_rate,
            filled_quantity: o.filled_quantity,
            order_side: o.side,
            order_type: o.order_type,
            status: o.status,
            create_time: o.create_time,
            update_time: o.update_time,
        }
    }
}

impl From<OrderWire> for Order {
    fn from(w: OrderWire) -> Self {
        Self {
            order_id: w.order_id,
            user_id: w.user_id,
            price: w.price,
            quantity: w.quantity,
            filled_quantity: w.filled_quantity,
            fee_rate: w.fee_rate,
            side: w.order_side,
            order_type: w.order_type,
            status: w.status,
            create_time: w.create_time,
            update_time: w.update_time,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TradeRecordWire {
    #[serde(rename = "tradeId")]
    trade_id: u64,
    #[serde(rename = "buyerUserId")]
    buyer_user_id: u64,
    #[serde(rename = "sellerUserId")]
    seller_user_id: u64,
    #[serde(rename = "buyerOrderId")]
    buyer_order_id: OrderID,
    #[serde(rename = "sellerOrderId")]
    seller_order_id: OrderID,
    #[serde(rename = "orderType")]
    order_type: Side,
    #[serde(rename = "tradePrice")]
    trade_price: f64,
    #[serde(rename = "tradeQuantity")]
    trade_quantity: f64,
    #[serde(rename = "buyerFee")]
    buyer_fee: f64,
    #[serde(rename = "sellerFee")]
    seller_fee: f64,
    #[serde(rename = "tradeTime", with = "timestamp")]
    trade_time: DateTime<Utc>,
}

impl From<&TradeRecord> for TradeRecordWire {
    fn from(t: &TradeRecord) -> Self {
        Self {
            trade_id: t.trade_id,
            buyer_user_id: t.buyer_user_id,
            seller_user_id: t.seller_user_id,
            buyer_order_id: t.buyer_order_id,
            seller_order_id: t.seller_order_id,
            order_type: t.order_type,
            trade_price: t.trade_price,
            trade_quantity: t.trade_quantity,
            buyer_fee: t.buyer_fee,
            seller_fee: t.seller_fee,
            trade_time: t.trade_time,
        }
    }
}

impl From<TradeRecordWire> for TradeRecord {
    fn from(w: TradeRecordWire) -> Self {
        Self {
            trade_id: w.trade_id,
            buyer_user_id: w.buyer_user_id,
            seller_user_id: w.seller_user_id,
            buyer_order_id: w.buyer_order_id,
            seller_order_id: w.seller_order_id,
            order_type: w.order_type,
            trade_price: w.trade_price,
            trade_quantity: w.trade_quantity,
            buyer_fee: w.buyer_fee,
            seller_fee: w.seller_fee,
            trade_time: w.trade_time,
        }
    }
}

/// Envelope is the decoded, domain-typed form of one wire message. Every
/// variant carries a `"type"` discriminant on the wire; `Order`,
/// `UnmatchedOrder`, and `Trade` additionally double-encode their payload
/// fields as JSON strings, a compatibility wart inherited from the source
/// stream. `Cancel` is plain, nested JSON.
#[derive(Debug, Clone)]
pub enum Envelope {
    Order(Order),
    Cancel { order_id: OrderID, side: Side },
    UnmatchedOrder(Order),
    Trade {
        buy_order: Order,
        sell_order: Order,
        trade: TradeRecord,
    },
}

#[derive(Serialize, Deserialize)]
struct CancelWire {
    #[serde(rename = "orderId")]
    order_id: OrderID,
    #[serde(rename = "orderSide")]
    order_side: Side,
}

fn encode_inner<T: Serialize>(value: &T) -> String {
    // Infallible: every wire struct here serializes only primitives, enums,
    // and our own timestamp format, none of which can fail to encode.
    serde_json::to_string(value).expect("wire struct is always serializable")
}

impl Envelope {
    pub fn encode(&self) -> String {
        match self {
            Envelope::Order(order) => {
                let payload = encode_inner(&OrderWire::from(order));
                let mut obj = serde_json::Map::new();
                obj.insert("type".into(), Value::from("ORDER"));
                obj.insert("order".into(), Value::from(payload));
                encode_inner(&Value::Object(obj))
            }
            Envelope::Cancel { order_id, side } => encode_inner(&serde_json::json!({
                "type": "CANCEL",
                "orderId": order_id,
                "orderSide": side,
            })),
            Envelope::UnmatchedOrder(order) => {
                let payload = encode_inner(&OrderWire::from(order));
                let mut obj = serde_json::Map::new();
                obj.insert("type".into(), Value::from("UNMATCHED_ORDER"));
                obj.insert("order".into(), Value::from(payload));
                encode_inner(&Value::Object(obj))
            }
            Envelope::Trade {
                buy_order,
                sell_order,
                trade,
            } => {
                let mut obj = serde_json::Map::new();
                obj.insert("type".into(), Value::from("TRADE"));
                obj.insert("buyOrder".into(), Value::from(encode_inner(&OrderWire::from(buy_order))));
                obj.insert("sellOrder".into(), Value::from(encode_inner(&OrderWire::from(sell_order))));
                obj.insert(
                    "tradeRecord".into(),
                    Value::from(encode_inner(&TradeRecordWire::from(trade))),
                );
                encode_inner(&Value::Object(obj))
            }
        }
    }

    pub fn decode(bytes: &[u8]) -> Result<Envelope, EnvelopeError> {
        let text = std::str::from_utf8(bytes)?;
        let value: Value = serde_json::from_str(text)?;
        let obj = value.as_object().ok_or(EnvelopeError::MissingField("type"))?;
        let ty = obj
            .get("type")
            .and_then(Value::as_str)
            .ok_or(EnvelopeError::MissingField("type"))?;

        match ty {
            "ORDER" => {
                let order = decode_nested_order(obj, "order")?;
                Ok(Envelope::Order(order))
            }
            "UNMATCHED_ORDER" => {
                let order = decode_nested_order(obj, "order")?;
                Ok(Envelope::UnmatchedOrder(order))
            }
            "CANCEL" => {
                let cancel: CancelWire = serde_json::from_value(value.clone())?;
                Ok(Envelope::Cancel {
                    order_id: cancel.order_id,
                    side: cancel.order_side,
                })
            }
            "TRADE" => {
                let buy_order = decode_nested_order(obj, "buyOrder")?;
                let sell_order = decode_nested_order(obj, "sellOrder")?;
                let trade_raw = obj
                    .get("tradeRecord")
                    .and_then(Value::as_str)
                    .ok_or(EnvelopeError::MissingField("tradeRecord"))?;
                let trade_wire: TradeRecordWire = serde_json::from_str(trade_raw)?;
                Ok(Envelope::Trade {
                    buy_order,
                    sell_order,
                    trade: trade_wire.into(),
                })
            }
            other => Err(EnvelopeError::UnknownType(other.to_string())),
        }
    }
}

fn decode_nested_order(
    obj: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Order, EnvelopeError> {
    let raw = obj.get(field).and_then(Value::as_str).ok_or(EnvelopeError::MissingField(field))?;
    let wire: OrderWire = serde_json::from_str(raw)?;
    if !wire.price.is_finite() || !wire.quantity.is_finite() || !wire.fee_rate.is_finite() {
        return Err(EnvelopeError::NonFinite(field));
    }
    if wire.quantity <= 0.0 {
        return Err(EnvelopeError::NonPositiveQuantity(wire.quantity));
    }
    Ok(wire.into())
}
