use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewOrder, Order, OrderStatus, TxRef},
    order_objects::OrderQueryFilter,
    traits::MarketplaceError,
};

/// Inserts a new order in `pending` status. The UNIQUE constraint on `tx_ref` is the store-level guarantee of
/// exactly-once transaction-reference use; a violation is surfaced as `DuplicateTxRef`.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, MarketplaceError> {
    let tx_ref = order.tx_ref.clone();
    let result: Result<Order, sqlx::Error> = sqlx::query_as(
        r#"
            INSERT INTO orders (buyer_id, product_id, quantity, total_price, tx_ref)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order.buyer_id)
    .bind(order.product_id)
    .bind(order.quantity)
    .bind(order.total_price)
    .bind(order.tx_ref)
    .fetch_one(conn)
    .await;
    match result {
        Ok(order) => {
            debug!("📝️ Order inserted with id {} and tx_ref {}", order.id, order.tx_ref);
            Ok(order)
        },
        Err(e) if e.as_database_error().map(|d| d.is_unique_violation()).unwrap_or(false) => {
            Err(MarketplaceError::DuplicateTxRef(tx_ref))
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(order_id).fetch_optional(conn).await?;
    Ok(order)
}

pub async fn fetch_order_by_tx_ref(tx_ref: &TxRef, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order =
        sqlx::query_as("SELECT * FROM orders WHERE tx_ref = $1").bind(tx_ref.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Orders placed by the buyer, newest first.
pub async fn fetch_orders_for_buyer(
    buyer_id: i64,
    filter: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders WHERE buyer_id = ");
    builder.push_bind(buyer_id);
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status);
    }
    builder.push(" ORDER BY created_at DESC");
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

/// Orders against any product belonging to the owner, newest first.
pub async fn fetch_orders_for_owner(
    owner_id: i64,
    filter: OrderQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new(
        r#"
        SELECT
            orders.id as id,
            buyer_id,
            product_id,
            quantity,
            total_price,
            tx_ref,
            orders.status as status,
            orders.created_at as created_at,
            orders.updated_at as updated_at
        FROM orders JOIN products ON orders.product_id = products.id
        WHERE products.owner_id = "#,
    );
    builder.push_bind(owner_id);
    if let Some(status) = filter.status {
        builder.push(" AND orders.status = ");
        builder.push_bind(status);
    }
    builder.push(" ORDER BY orders.created_at DESC");
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    Ok(orders)
}

pub async fn update_order_status(
    order_id: i64,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, MarketplaceError> {
    let result: Option<Order> =
        sqlx::query_as("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 RETURNING *")
            .bind(status)
            .bind(order_id)
            .fetch_optional(conn)
            .await?;
    result.ok_or(MarketplaceError::OrderNotFound(order_id))
}
