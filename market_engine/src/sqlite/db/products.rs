use log::trace;
use sqlx::{sqlite::SqliteRow, FromRow, QueryBuilder, SqliteConnection};

use crate::{
    db_types::{NewProduct, Product, ProductStatus, ProductUpdate},
    helpers::status_after_stock_change,
    traits::MarketplaceError,
};

pub async fn insert_product(product: NewProduct, conn: &mut SqliteConnection) -> Result<Product, MarketplaceError> {
    // A listing created with zero stock starts out_of_stock rather than active.
    let status = status_after_stock_change(ProductStatus::Active, product.stock);
    let product = sqlx::query_as(
        r#"
            INSERT INTO products (owner_id, title, description, price, stock, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(product.owner_id)
    .bind(product.title)
    .bind(product.description)
    .bind(product.price)
    .bind(product.stock)
    .bind(status)
    .fetch_one(conn)
    .await?;
    Ok(product)
}

pub async fn fetch_product_by_id(
    product_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_active_products(conn: &mut SqliteConnection) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as("SELECT * FROM products WHERE status = 'active' ORDER BY created_at DESC")
        .fetch_all(conn)
        .await?;
    Ok(products)
}

pub async fn fetch_products_for_owner(
    owner_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<Product>, sqlx::Error> {
    let products = sqlx::query_as(
        "SELECT * FROM products WHERE owner_id = $1 AND status != 'deleted' ORDER BY created_at DESC",
    )
    .bind(owner_id)
    .fetch_all(conn)
    .await?;
    Ok(products)
}

/// Applies the partial update. The caller supplies the product's current status so that a stock change can recompute
/// it via [`status_after_stock_change`] in the same statement as the rest of the update.
pub async fn update_product(
    product_id: i64,
    update: ProductUpdate,
    current_status: ProductStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, MarketplaceError> {
    if update.is_empty() {
        return Ok(fetch_product_by_id(product_id, conn).await?);
    }
    let mut builder = QueryBuilder::new("UPDATE products SET updated_at = CURRENT_TIMESTAMP, ");
    let mut set_clause = builder.separated(", ");
    if let Some(title) = update.title {
        set_clause.push("title = ");
        set_clause.push_bind_unseparated(title);
    }
    if let Some(description) = update.description {
        set_clause.push("description = ");
        set_clause.push_bind_unseparated(description);
    }
    if let Some(price) = update.price {
        set_clause.push("price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(stock) = update.stock {
        set_clause.push("stock = ");
        set_clause.push_bind_unseparated(stock);
        let status = status_after_stock_change(current_status, stock);
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status);
    }
    builder.push(" WHERE id = ");
    builder.push_bind(product_id);
    builder.push(" RETURNING *");
    trace!("🏷️ Executing query: {}", builder.sql());
    let res = builder.build().fetch_optional(conn).await?.map(|row: SqliteRow| Product::from_row(&row)).transpose()?;
    Ok(res)
}

pub async fn soft_delete(product_id: i64, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(
        "UPDATE products SET status = 'deleted', updated_at = CURRENT_TIMESTAMP WHERE id = $1 RETURNING *",
    )
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

/// The verification-time stock debit. The stock check and the decrement are one conditional statement, so two racing
/// settlements cannot both succeed on the last unit; the loser sees `None`. Stock hitting zero demotes an active
/// product to out_of_stock in the same write.
pub async fn debit_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
            UPDATE products
            SET stock = stock - $1,
                status = CASE WHEN stock - $1 <= 0 AND status = 'active' THEN 'out_of_stock' ELSE status END,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2 AND stock >= $1
            RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}

/// The compensating restore for reverted orders. Promotes out_of_stock back to active when stock becomes positive;
/// deleted products keep their terminal status but still get their stock back.
pub async fn restore_stock(
    product_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Product>, sqlx::Error> {
    let product = sqlx::query_as(
        r#"
            UPDATE products
            SET stock = stock + $1,
                status = CASE WHEN status = 'out_of_stock' AND stock + $1 > 0 THEN 'active' ELSE status END,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $2
            RETURNING *;
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .fetch_optional(conn)
    .await?;
    Ok(product)
}
