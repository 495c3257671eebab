use actix_web::{http::StatusCode, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use market_engine::{
    db_types::{Order, OrderStatus, Product, ProductStatus, TxRef},
    OrderFlowApi,
};
use mkt_common::Price;

use super::{
    helpers::{get_request, issue_token, patch_request},
    mocks::MockMarketDb,
};
use crate::routes::{MyOrdersRoute, OrderByIdRoute, UpdateOrderStatusRoute};

const BUYER_ID: i64 = 10;
const SELLER_ID: i64 = 7;

#[actix_web::test]
async fn fetch_my_orders_no_token() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/orders", configure_my_orders).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. No access token was provided.");
}

#[actix_web::test]
async fn fetch_my_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(BUYER_ID, "Bruk");
    let (status, body) = get_request(&token, "/orders", configure_my_orders).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, ORDERS_JSON);
}

#[actix_web::test]
async fn fetch_my_orders_with_garbage_token() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(BUYER_ID, "Bruk");
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    let err = get_request(&token, "/orders", configure_my_orders).await.expect_err("Expected error");
    assert!(err.starts_with("Authentication Error."), "unexpected error: {err}");
}

#[actix_web::test]
async fn order_is_visible_to_its_buyer() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(BUYER_ID, "Bruk");
    let (status, body) = get_request(&token, "/orders/1", configure_order_lookup).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""id":1"#));
}

#[actix_web::test]
async fn order_is_visible_to_the_product_owner() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(SELLER_ID, "Sena");
    let (status, _) = get_request(&token, "/orders/1", configure_order_lookup).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

#[actix_web::test]
async fn order_is_hidden_from_strangers() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(99, "Lulit");
    let err = get_request(&token, "/orders/1", configure_order_lookup).await.expect_err("Request should have failed");
    assert!(err.starts_with("Insufficient Permissions."), "unexpected error: {err}");
}

#[actix_web::test]
async fn missing_order_is_not_found_even_for_strangers() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(99, "Lulit");
    let err = get_request(&token, "/orders/404", configure_missing_order).await.expect_err("Expected error");
    assert!(err.starts_with("The data was not found."), "unexpected error: {err}");
}

#[actix_web::test]
async fn status_update_by_non_owner_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(BUYER_ID, "Bruk");
    let body = serde_json::json!({ "status": "failed" });
    let err = patch_request(&token, "/orders/1/status", body, configure_order_lookup)
        .await
        .expect_err("Request should have failed");
    assert!(err.starts_with("Insufficient Permissions."), "unexpected error: {err}");
}

#[actix_web::test]
async fn owner_reverting_a_successful_order_restores_stock() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(SELLER_ID, "Sena");
    let body = serde_json::json!({ "status": "failed" });
    let (status, body) = patch_request(&token, "/orders/1/status", body, configure_revert).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""status":"failed""#));
}

fn sample_order(status: OrderStatus) -> Order {
    Order {
        id: 1,
        buyer_id: Some(BUYER_ID),
        product_id: 5,
        quantity: 2,
        total_price: Price::from(29_998),
        tx_ref: TxRef::from("mkt-0000000000000001-00000001".to_string()),
        status,
        created_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 29, 13, 30, 0).unwrap(),
    }
}

fn sample_product() -> Product {
    Product {
        id: 5,
        owner_id: SELLER_ID,
        title: "Handwoven scarf".to_string(),
        description: String::new(),
        price: Price::from(14_999),
        stock: 8,
        status: ProductStatus::Active,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
    }
}

fn register(cfg: &mut ServiceConfig, db: MockMarketDb) {
    cfg.service(MyOrdersRoute::<MockMarketDb>::new())
        .service(UpdateOrderStatusRoute::<MockMarketDb>::new())
        .service(OrderByIdRoute::<MockMarketDb>::new())
        .app_data(web::Data::new(OrderFlowApi::new(db)));
}

fn configure_my_orders(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_orders_for_buyer()
        .returning(|_, _| Ok(vec![sample_order(OrderStatus::Successful), sample_order(OrderStatus::Pending)]));
    register(cfg, db);
}

fn configure_order_lookup(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order(OrderStatus::Pending))));
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product())));
    register(cfg, db);
}

fn configure_missing_order(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_order().returning(|_| Ok(None));
    register(cfg, db);
}

fn configure_revert(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_order().returning(|_| Ok(Some(sample_order(OrderStatus::Successful))));
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product())));
    db.expect_revert_order().returning(|_| Ok(sample_order(OrderStatus::Failed)));
    register(cfg, db);
}

const ORDERS_JSON: &str = r#"[{"id":1,"buyer_id":10,"product_id":5,"quantity":2,"total_price":29998,"tx_ref":"mkt-0000000000000001-00000001","status":"successful","created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z"},{"id":1,"buyer_id":10,"product_id":5,"quantity":2,"total_price":29998,"tx_ref":"mkt-0000000000000001-00000001","status":"pending","created_at":"2024-02-29T13:30:00Z","updated_at":"2024-02-29T13:30:00Z"}]"#;
