use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chapa_tools::{ChapaApiError, CheckoutSession};
use chrono::{TimeZone, Utc};
use market_engine::{
    db_types::{Order, OrderStatus, Product, ProductStatus, User},
    OrderFlowApi,
};
use mkt_common::Price;

use super::{
    helpers::{issue_token, post_request},
    mocks::{MockGateway, MockMarketDb},
};
use crate::{checkout_routes::CheckoutRoute, config::ServerConfig};

const BUYER_ID: i64 = 10;
const SELLER_ID: i64 = 7;
const TX_REF: &str = "mkt-0000000000000001-00000001";

#[actix_web::test]
async fn checkout_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({ "product_id": 5, "quantity": 2 });
    let err = post_request("", "/checkout", body, configure_unreachable).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. No access token was provided.");
}

#[actix_web::test]
async fn checkout_creates_an_order_and_a_payment_session() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(BUYER_ID, "Bruk");
    let body = serde_json::json!({ "product_id": 5, "quantity": 2 });
    let (status, body) = post_request(&token, "/checkout", body, configure_happy_path).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#""tx_ref":"mkt-0000000000000001-00000001""#), "unexpected body: {body}");
    assert!(body.contains(r#""total_price":29998"#), "unexpected body: {body}");
    assert!(body.contains("https://checkout.chapa.co/pay/mkt-test"), "unexpected body: {body}");
}

#[actix_web::test]
async fn gateway_failure_abandons_the_fresh_order() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(BUYER_ID, "Bruk");
    let body = serde_json::json!({ "product_id": 5, "quantity": 2 });
    let err = post_request(&token, "/checkout", body, configure_gateway_failure).await.expect_err("Expected error");
    assert_eq!(err, "The payment could not be set up. Please try again later.");
}

#[actix_web::test]
async fn checkout_with_insufficient_stock_never_reaches_the_gateway() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(BUYER_ID, "Bruk");
    let body = serde_json::json!({ "product_id": 5, "quantity": 50 });
    // Neither insert_order nor the gateway carry expectations; the stock check must fail first.
    let err = post_request(&token, "/checkout", body, configure_low_stock).await.expect_err("Expected error");
    assert!(err.contains("Insufficient stock for product 5"), "unexpected error: {err}");
}

#[actix_web::test]
async fn checkout_of_a_deleted_product_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(BUYER_ID, "Bruk");
    let body = serde_json::json!({ "product_id": 5, "quantity": 1 });
    let err = post_request(&token, "/checkout", body, configure_deleted_product).await.expect_err("Expected error");
    assert!(err.contains("no longer available"), "unexpected error: {err}");
}

fn sample_buyer() -> User {
    User {
        id: BUYER_ID,
        name: "Bruk".to_string(),
        email: "bruk@example.com".to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap(),
    }
}

fn sample_product(stock: i64, status: ProductStatus) -> Product {
    Product {
        id: 5,
        owner_id: SELLER_ID,
        title: "Handwoven scarf".to_string(),
        description: String::new(),
        price: Price::from(14_999),
        stock,
        status,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
    }
}

fn pending_order() -> Order {
    Order {
        id: 1,
        buyer_id: Some(BUYER_ID),
        product_id: 5,
        quantity: 2,
        total_price: Price::from(29_998),
        tx_ref: TX_REF.to_string().into(),
        status: OrderStatus::Pending,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn register(cfg: &mut ServiceConfig, db: MockMarketDb, gateway: MockGateway) {
    let config = ServerConfig { callback_url: "https://shop.example.com/webhook/chapa".to_string(), ..Default::default() };
    cfg.service(CheckoutRoute::<MockMarketDb, MockGateway>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db)))
        .app_data(web::Data::new(gateway))
        .app_data(web::Data::new(config));
}

// For requests that must be rejected before the handler runs; no database or gateway call is tolerated.
fn configure_unreachable(cfg: &mut ServiceConfig) {
    register(cfg, MockMarketDb::new(), MockGateway::new());
}

fn configure_happy_path(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    // The buyer row feeds both the existence check and the gateway contact details from a single lookup.
    db.expect_fetch_user().times(1).returning(|_| Ok(Some(sample_buyer())));
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product(8, ProductStatus::Active))));
    db.expect_insert_order().returning(|_| Ok(pending_order()));
    let mut gateway = MockGateway::new();
    gateway.expect_initialize().returning(|_| {
        Ok(CheckoutSession { checkout_url: "https://checkout.chapa.co/pay/mkt-test".to_string() })
    });
    register(cfg, db, gateway);
}

fn configure_gateway_failure(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_user().returning(|_| Ok(Some(sample_buyer())));
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product(8, ProductStatus::Active))));
    db.expect_insert_order().returning(|_| Ok(pending_order()));
    db.expect_update_order_status()
        .withf(|id, status| *id == 1 && *status == OrderStatus::Failed)
        .times(1)
        .returning(|_, _| {
            let mut order = pending_order();
            order.status = OrderStatus::Failed;
            Ok(order)
        });
    let mut gateway = MockGateway::new();
    gateway
        .expect_initialize()
        .returning(|_| Err(ChapaApiError::QueryError { status: 503, message: "upstream unavailable".to_string() }));
    register(cfg, db, gateway);
}

fn configure_low_stock(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_user().returning(|_| Ok(Some(sample_buyer())));
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product(1, ProductStatus::Active))));
    register(cfg, db, MockGateway::new());
}

fn configure_deleted_product(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_user().returning(|_| Ok(Some(sample_buyer())));
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product(8, ProductStatus::Deleted))));
    register(cfg, db, MockGateway::new());
}
