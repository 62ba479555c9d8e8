use crate::config::DbConfig;
use crate::prelude::*;
use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};

const POOL_SIZE: u32 = 10;

/// Store fronts the relational schema that holds orders and trade records.
/// Queries are parameterized throughout (see DESIGN.md for the rationale).
#[derive(Clone)]
pub struct Store {
    pool: PgPool,
}

impl Store {
    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(POOL_SIZE)
            .connect(&config.connection_string())
            .await
            .context("connecting to the orders database")?;
        Ok(Self { pool })
    }

    /// Applies one trade atomically: both participating orders' status and
    /// filled quantity are updated, and the trade record is inserted, all
    /// within a single transaction.
    ///
    /// The trade insert is idempotent on `(buyer_order_id, seller_order_id,
    /// trade_quantity, trade_time)` so replaying the same event after a
    /// reconnect does not double-count it.
    pub async fn apply_trade(
        &self,
        trade: &TradeRecord,
        buy_order: &Order,
        sell_order: &Order,
    ) -> anyhow::Result<()> {
        let mut tx = self.pool.begin().await.context("beginning trade transaction")?;

        update_order_row(&mut tx, buy_order).await?;
        update_order_row(&mut tx, sell_order).await?;

        sqlx::query(
            "INSERT INTO trade_records \
                (trade_id, buyer_order_id, seller_order_id, order_type, trade_price, \
                 trade_quantity, buyer_fee, seller_fee, trade_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (buyer_order_id, seller_order_id, trade_quantity, trade_time) DO NOTHING",
        )
        .bind(trade.trade_id as i64)
        .bind(trade.buyer_order_id as i64)
        .bind(trade.seller_order_id as i64)
        .bind(trade.order_type.as_str())
        .bind(trade.trade_price)
        .bind(trade.trade_quantity)
        .bind(trade.buyer_fee)
        .bind(trade.seller_fee)
        .bind(trade.trade_time)
        .execute(&mut *tx)
        .await
        .context("inserting trade record")?;

        tx.commit().await.context("committing trade transaction")?;
        Ok(())
    }

    /// Applies a status update for a single order outside of a transaction
    /// (used for `UNMATCHED_ORDER` and cancellation status events).
    pub async fn apply_status_update(&self, order: &Order) -> anyhow::Result<()> {
        let mut conn = self.pool.acquire().await.context("acquiring connection")?;
        update_order_row(&mut conn, order).await
    }

    /// Inserts a brand-new order row, used by the producer role before it
    /// publishes a freshly generated order.
    pub async fn insert_new_order(&self, order: &Order) -> anyhow::Result<()> {
        sqlx::query(
            "INSERT INTO orders \
                (order_id, user_id, price, quantity, fee_rate, order_side, order_type, \
                 status, filled_quantity, create_time, update_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(order.order_id as i64)
        .bind(order.user_id as i64)
        .bind(order.price)
        .bind(order.quantity)
        .bind(order.fee_rate)
        .bind(order.side.as_str())
        .bind(order.order_type.as_str())
        .bind(order.status.as_str())
        .bind(order.filled_quantity)
        .bind(order.create_time)
        .bind(order.update_time)
        .execute(&self.pool)
        .await
        .context("inserting new order")?;
        Ok(())
    }

    /// Returns every order still eligible for replay
    /// (`INITIAL`/`MATCHING`/`PARTIALLY_FILLED`), ordered by creation time,
    /// for the producer's startup replay.
    pub async fn replay_candidates(&self) -> anyhow::Result<Vec<Order>> {
        let rows = sqlx::query(
            "SELECT order_id, user_id, price, quantity, fee_rate, order_side, order_type, \
                    status, filled_quantity, create_time, update_time \
             FROM orders \
             WHERE status IN ('INITIAL', 'MATCHING', 'PARTIALLY_FILLED') \
             ORDER BY create_time ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("querying replay candidates")?;

        rows.iter().map(row_to_order).collect()
    }

    /// Returns the highest `order_id` currently stored, used to seed the
    /// producer's fresh-id counter above any persisted order.
    pub async fn max_order_id(&self) -> anyhow::Result<Option<OrderID>> {
        let row = sqlx::query("SELECT MAX(order_id) AS max_id FROM orders")
            .fetch_one(&self.pool)
            .await
            .context("querying max order id")?;
        let max_id: Option<i64> = row.try_get("max_id").context("reading max_id column")?;
        Ok(max_id.map(|id| id as OrderID))
    }

    /// Returns every trade record at or after `since`, ordered by time, for
    /// the kline aggregation role.
    pub async fn trades_since(&self, since: DateTime<Utc>) -> anyhow::Result<Vec<TradeRecord>> {
        let rows = sqlx::query(
            "SELECT trade_id, buyer_order_id, seller_order_id, order_type, trade_price, \
                    trade_quantity, buyer_fee, seller_fee, trade_time \
             FROM trade_records \
             WHERE trade_time >= $1 \
             ORDER BY trade_time ASC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context("querying trades since")?;

        rows.iter().map(row_to_trade).collect()
    }
}

async fn update_order_row<'c, E>(executor: E, order: &Order) -> anyhow::Result<()>
where
    E: sqlx::Executor<'c, Database = sqlx::Postgres>,
{
    sqlx::query(
        "UPDATE orders SET status = $1, filled_quantity = $2, update_time = $3 WHERE order_id = $4",
    )
    .bind(order.status.as_str())
    .bind(order.filled_quantity)
    .bind(order.update_time)
    .bind(order.order_id as i64)
    .execute(executor)
    .await
    .context("updating order status")?;
    Ok(())
}

fn row_to_order(row: &sqlx::postgres::PgRow) -> anyhow::Result<Order> {
    let side_raw: String = row.try_get("order_side")?;
    let type_raw: String = row.try_get("order_type")?;
    let status_raw: String = row.try_get("status")?;
    Ok(Order {
        order_id: row.try_get::<i64, _>("order_id")? as OrderID,
        user_id: row.try_get::<i64, _>("user_id")? as u64,
        price: row.try_get("price")?,
        quantity: row.try_get("quantity")?,
        filled_quantity: row.try_get("filled_quantity")?,
        fee_rate: row.try_get("fee_rate")?,
        side: Side::parse(&side_raw).context("unrecognized order_side column value")?,
        order_type: OrderType::parse(&type_raw).context("unrecognized order_type column value")?,
        status: OrderStatus::parse(&status_raw).context("unrecognized status column value")?,
        create_time: row.try_get("create_time")?,
        update_time: row.try_get("update_time")?,
    })
}

fn row_to_trade(row: &sqlx::postgres::PgRow) -> anyhow::Result<TradeRecord> {
    let side_raw: String = row.try_get("order_type")?;
    Ok(TradeRecord {
        trade_id: row.try_get::<i64, _>("trade_id")? as u64,
        buyer_user_id: 0,
        seller_user_id: 0,
        buyer_order_id: row.try_get::<i64, _>("buyer_order_id")? as OrderID,
        seller_order_id: row.try_get::<i64, _>("seller_order_id")? as OrderID,
        order_type: Side::parse(&side_raw).context("unrecognized order_type column value")?,
        trade_price: row.try_get("trade_price")?,
        trade_quantity: row.try_get("trade_quantity")?,
        buyer_fee: row.try_get("buyer_fee")?,
        seller_fee: row.try_get("seller_fee")?,
        trade_time: row.try_get("trade_time")?,
    })
}
