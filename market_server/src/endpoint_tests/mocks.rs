use chapa_tools::{ChapaApiError, CheckoutRequest, CheckoutSession, HostedCheckout, VerificationData};
use market_engine::{
    db_types::{NewOrder, NewProduct, Order, OrderStatus, Product, ProductUpdate, TxRef, User},
    order_objects::OrderQueryFilter,
    traits::Settlement,
    MarketplaceDatabase,
    MarketplaceError,
};
use mockall::mock;

mock! {
    pub MarketDb {}
    impl MarketplaceDatabase for MarketDb {
        fn url(&self) -> &str;
        async fn fetch_user(&self, user_id: i64) -> Result<Option<User>, MarketplaceError>;
        async fn insert_product(&self, product: NewProduct) -> Result<Product, MarketplaceError>;
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, MarketplaceError>;
        async fn fetch_catalogue(&self) -> Result<Vec<Product>, MarketplaceError>;
        async fn fetch_products_for_owner(&self, owner_id: i64) -> Result<Vec<Product>, MarketplaceError>;
        async fn update_product(&self, product_id: i64, update: ProductUpdate) -> Result<Product, MarketplaceError>;
        async fn delete_product(&self, product_id: i64) -> Result<Product, MarketplaceError>;
        async fn insert_order(&self, order: NewOrder) -> Result<Order, MarketplaceError>;
        async fn fetch_order(&self, order_id: i64) -> Result<Option<Order>, MarketplaceError>;
        async fn fetch_order_by_tx_ref(&self, tx_ref: &TxRef) -> Result<Option<Order>, MarketplaceError>;
        async fn fetch_orders_for_buyer(&self, buyer_id: i64, filter: OrderQueryFilter) -> Result<Vec<Order>, MarketplaceError>;
        async fn fetch_orders_for_owner(&self, owner_id: i64, filter: OrderQueryFilter) -> Result<Vec<Order>, MarketplaceError>;
        async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> Result<Order, MarketplaceError>;
        async fn settle_order(&self, tx_ref: &TxRef) -> Result<Settlement, MarketplaceError>;
        async fn revert_order(&self, order_id: i64) -> Result<Order, MarketplaceError>;
        async fn close(&mut self) -> Result<(), MarketplaceError>;
    }
    impl Clone for MarketDb {
        fn clone(&self) -> Self;
    }
}

mock! {
    pub Gateway {}
    impl HostedCheckout for Gateway {
        async fn initialize(&self, request: &CheckoutRequest) -> Result<CheckoutSession, ChapaApiError>;
        async fn verify(&self, tx_ref: &str) -> Result<VerificationData, ChapaApiError>;
    }
}
