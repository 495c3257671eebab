use thiserror::Error;

use crate::{
    db_types::{NewOrder, NewProduct, Order, OrderStatus, Product, ProductStatus, ProductUpdate, TxRef, User},
    order_objects::OrderQueryFilter,
    traits::Settlement,
};

/// The persistence contract for the marketplace core.
///
/// A backend provides:
/// * user lookups (accounts themselves are managed elsewhere),
/// * product CRUD with soft deletion,
/// * order CRUD keyed by id and by transaction reference,
/// * the two stock-affecting compound writes, [`Self::settle_order`] and [`Self::revert_order`], which must each run
///   atomically — the product stock/status pair and the order status are one unit per write.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone {
    /// The URL of the database
    fn url(&self) -> &str;

    async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, MarketplaceError>;

    async fn insert_product(&self, product: NewProduct) -> Result<Product, MarketplaceError>;

    /// Fetches a product row regardless of status. Callers decide whether deleted rows are visible.
    async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, MarketplaceError>;

    /// All products with `active` status, newest first.
    async fn fetch_catalogue(&self) -> Result<Vec<Product>, MarketplaceError>;

    /// All non-deleted products belonging to the owner, newest first.
    async fn fetch_products_for_owner(&self, owner_id: i64) -> Result<Vec<Product>, MarketplaceError>;

    /// Applies a partial update. A stock change recomputes the product status (zero stock demotes to `out_of_stock`,
    /// a positive restock promotes `out_of_stock` back to `active`). The update and the status recomputation are
    /// a single atomic write.
    async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, MarketplaceError>;

    /// Soft-deletes the product by flipping its status to `deleted`. The row is never removed; historical orders
    /// keep a valid reference.
    async fn delete_product(&self, product_id: i64) -> Result<Product, MarketplaceError>;

    /// Inserts a new order in `pending` status. The transaction reference must be globally unique; a clash returns
    /// [`MarketplaceError::DuplicateTxRef`].
    async fn insert_order(&self, order: NewOrder) -> Result<Order, MarketplaceError>;

    async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, MarketplaceError>;

    async fn fetch_order_by_tx_ref(&self, tx_ref: &TxRef) -> Result<Option<Order>, MarketplaceError>;

    /// Orders placed by the buyer, newest first, optionally filtered by status.
    async fn fetch_orders_for_buyer(
        &self,
        buyer_id: i64,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, MarketplaceError>;

    /// Orders against any product belonging to the owner, newest first, optionally filtered by status.
    async fn fetch_orders_for_owner(
        &self,
        owner_id: i64,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, MarketplaceError>;

    /// Writes a bare status change with no inventory side effect.
    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, MarketplaceError>;

    /// Resolves a pending order after the gateway has confirmed payment. In one transaction:
    /// * the order is looked up by `tx_ref`;
    /// * if it is no longer `pending`, it is returned unchanged ([`Settlement::AlreadyFinal`]);
    /// * otherwise the product stock is debited with a conditional decrement (`stock >= quantity` enforced in the
    ///   same statement), demoting the product to `out_of_stock` when stock hits zero, and the order becomes
    ///   `successful` ([`Settlement::Completed`]);
    /// * if the decrement finds insufficient stock, the order becomes `failed`
    ///   ([`Settlement::StockShortfall`]).
    ///
    /// The product write is ordered before the order write so that an order is never `successful` without its stock
    /// debit being durable.
    async fn settle_order(&self, tx_ref: &TxRef) -> Result<Settlement, MarketplaceError>;

    /// The compensating path for owner-forced `successful → failed` transitions. In one transaction, restores the
    /// order quantity to the product stock (promoting `out_of_stock` back to `active` when stock becomes positive)
    /// and marks the order `failed`.
    async fn revert_order(&self, order_id: i64) -> Result<Order, MarketplaceError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), MarketplaceError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("User {0} does not exist")]
    UserNotFound(i64),
    #[error("Product {0} does not exist")]
    ProductNotFound(i64),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("No order exists for transaction reference {0}")]
    TxRefNotFound(TxRef),
    #[error("Product {0} is no longer available")]
    ProductNoLongerAvailable(i64),
    #[error("Product {product_id} cannot be ordered; its current status is {status}")]
    ProductNotActive { product_id: i64, status: ProductStatus },
    #[error("Insufficient stock for product {product_id}: {available} available, {requested} requested")]
    InsufficientStock { product_id: i64, available: i64, requested: i64 },
    #[error(
        "Payment for order {order_id} was received, but only {available} of {requested} units remain. The order has \
         been marked as failed and the payment must be refunded manually."
    )]
    StockExhaustedAfterPayment { order_id: i64, available: i64, requested: i64 },
    #[error("Permission denied. {0}")]
    PermissionDenied(String),
    #[error("An order already exists with transaction reference {0}")]
    DuplicateTxRef(TxRef),
    #[error("Invalid order quantity: {0}")]
    InvalidQuantity(i64),
    #[error("Invalid product definition: {0}")]
    InvalidProduct(String),
}

impl From<sqlx::Error> for MarketplaceError {
    fn from(e: sqlx::Error) -> Self {
        MarketplaceError::DatabaseError(e.to_string())
    }
}
