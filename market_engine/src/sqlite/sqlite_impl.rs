//! `SqliteDatabase` is the concrete SQLite backend for the marketplace engine.
//!
//! It implements [`MarketplaceDatabase`] over an `sqlx` connection pool. Single-row reads and writes acquire a
//! connection; the two stock-affecting compound operations (`settle_order`, `revert_order`) run inside transactions
//! so that the product stock/status pair and the order status move as one unit.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, orders, products, users};
use crate::{
    db_types::{NewOrder, NewProduct, Order, OrderStatus, Product, ProductUpdate, TxRef, User},
    order_objects::OrderQueryFilter,
    traits::{MarketplaceDatabase, MarketplaceError, Settlement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, MarketplaceError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Seeding helper. Account management is not part of this crate's surface, but tests and ops tooling need a way
    /// to create user rows.
    pub async fn insert_user(&self, name: &str, email: &str) -> Result<User, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::insert_user(name, email, &mut conn).await?;
        Ok(user)
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let user = users::fetch_user_by_id(user_id, &mut conn).await?;
        Ok(user)
    }

    async fn insert_product(&self, product: NewProduct) -> Result<Product, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::insert_product(product, &mut conn).await?;
        debug!("🗃️ Product {} has been saved in the DB", product.id);
        Ok(product)
    }

    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product_by_id(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_catalogue(&self) -> Result<Vec<Product>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_active_products(&mut conn).await?;
        Ok(product)
    }

    async fn fetch_products_for_owner(&self, owner_id: i64) -> Result<Vec<Product>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_products_for_owner(owner_id, &mut conn).await?;
        Ok(product)
    }

    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let current = products::fetch_product_by_id(product_id, &mut tx)
            .await?
            .ok_or(MarketplaceError::ProductNotFound(product_id))?;
        let updated = products::update_product(product_id, update, current.status, &mut tx)
            .await?
            .ok_or(MarketplaceError::ProductNotFound(product_id))?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_product(&self, product_id: i64) -> Result<Product, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::soft_delete(product_id, &mut conn)
            .await?
            .ok_or(MarketplaceError::ProductNotFound(product_id))?;
        Ok(product)
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::insert_order(order, &mut conn).await?;
        debug!("🗃️ Order #{} has been saved in the DB with tx_ref {}", order.id, order.tx_ref);
        Ok(order)
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_tx_ref(&self, tx_ref: &TxRef) -> Result<Option<Order>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_tx_ref(tx_ref, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders_for_buyer(
        &self,
        buyer_id: i64,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_buyer(buyer_id, filter, &mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_owner(
        &self,
        owner_id: i64,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_owner(owner_id, filter, &mut conn).await?;
        Ok(orders)
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, status, &mut conn).await?;
        Ok(order)
    }

    /// See [`MarketplaceDatabase::settle_order`]. The stock check and decrement are a single conditional UPDATE, so
    /// concurrent settlements cannot drive stock negative. The product write commits in the same transaction as,
    /// and before, the order write.
    async fn settle_order(&self, tx_ref: &TxRef) -> Result<Settlement, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let order = orders::fetch_order_by_tx_ref(tx_ref, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::TxRefNotFound(tx_ref.clone()))?;
        if order.status.is_final() {
            debug!("🗃️ Order #{} already {}; settlement is a no-op", order.id, order.status);
            return Ok(Settlement::AlreadyFinal(order));
        }
        let product = products::fetch_product_by_id(order.product_id, &mut tx)
            .await?
            .ok_or(MarketplaceError::ProductNotFound(order.product_id))?;
        match products::debit_stock(product.id, order.quantity, &mut tx).await? {
            Some(updated) => {
                debug!("🗃️ Debited {} units from product {}; {} remain", order.quantity, updated.id, updated.stock);
                let order = orders::update_order_status(order.id, OrderStatus::Successful, &mut tx).await?;
                tx.commit().await?;
                Ok(Settlement::Completed(order))
            },
            None => {
                warn!(
                    "🗃️ Stock shortfall settling order #{}: {} available, {} requested",
                    order.id, product.stock, order.quantity
                );
                let order = orders::update_order_status(order.id, OrderStatus::Failed, &mut tx).await?;
                tx.commit().await?;
                Ok(Settlement::StockShortfall { available: product.stock, requested: order.quantity, order })
            },
        }
    }

    /// See [`MarketplaceDatabase::revert_order`].
    async fn revert_order(&self, order_id: i64) -> Result<Order, MarketplaceError> {
        let mut tx = self.pool.begin().await?;
        let order =
            orders::fetch_order_by_id(order_id, &mut tx).await?.ok_or(MarketplaceError::OrderNotFound(order_id))?;
        let product = products::restore_stock(order.product_id, order.quantity, &mut tx)
            .await?
            .ok_or(MarketplaceError::ProductNotFound(order.product_id))?;
        debug!("🗃️ Restored {} units to product {}; stock is now {}", order.quantity, product.id, product.stock);
        let order = orders::update_order_status(order.id, OrderStatus::Failed, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn close(&mut self) -> Result<(), MarketplaceError> {
        self.pool.close().await;
        Ok(())
    }
}
