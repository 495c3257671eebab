use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::{TimeZone, Utc};
use market_engine::{
    db_types::{Product, ProductStatus},
    ProductApi,
};
use mkt_common::Price;

use super::{
    helpers::{get_request, issue_token, post_request, send_request},
    mocks::MockMarketDb,
};
use crate::routes::{CatalogueRoute, CreateProductRoute, DeleteProductRoute, ProductRoute, UpdateProductRoute};

const SELLER_ID: i64 = 7;

#[actix_web::test]
async fn catalogue_is_public() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products", configure_catalogue).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Handwoven scarf"));
}

#[actix_web::test]
async fn single_product_is_public() {
    let _ = env_logger::try_init().ok();
    let (status, body) = get_request("", "/products/5", configure_product_lookup).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""id":5"#));
}

#[actix_web::test]
async fn deleted_product_reads_as_missing() {
    let _ = env_logger::try_init().ok();
    let err = get_request("", "/products/5", configure_deleted_product).await.expect_err("Expected error");
    assert!(err.starts_with("The data was not found."), "unexpected error: {err}");
}

#[actix_web::test]
async fn create_product_requires_a_token() {
    let _ = env_logger::try_init().ok();
    let body = serde_json::json!({ "title": "Handwoven scarf", "price": 14999, "stock": 8 });
    let err = post_request("", "/products", body, configure_create).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. No access token was provided.");
}

#[actix_web::test]
async fn create_product_assigns_ownership_from_the_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(SELLER_ID, "Sena");
    let body = serde_json::json!({ "title": "Handwoven scarf", "price": 14999, "stock": 8 });
    let (status, body) = post_request(&token, "/products", body, configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.contains(r#""owner_id":7"#));
}

#[actix_web::test]
async fn create_product_with_negative_price_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(SELLER_ID, "Sena");
    let body = serde_json::json!({ "title": "Handwoven scarf", "price": -100, "stock": 8 });
    // No insert expectation is registered; validation must fail before the database is touched.
    let err = post_request(&token, "/products", body, configure_no_insert).await.expect_err("Expected error");
    assert!(err.contains("price may not be negative"), "unexpected error: {err}");
}

#[actix_web::test]
async fn update_by_non_owner_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(99, "Lulit");
    let body = serde_json::json!({ "title": "Hijacked" });
    let req = TestRequest::patch().uri("/products/5").set_json(body);
    let err = send_request(req, &token, configure_product_lookup).await.expect_err("Request should have failed");
    assert!(err.starts_with("Insufficient Permissions."), "unexpected error: {err}");
}

#[actix_web::test]
async fn delete_by_non_owner_is_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(99, "Lulit");
    let req = TestRequest::delete().uri("/products/5");
    let err = send_request(req, &token, configure_product_lookup).await.expect_err("Request should have failed");
    assert!(err.starts_with("Insufficient Permissions."), "unexpected error: {err}");
}

#[actix_web::test]
async fn owner_can_delete_their_product() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(SELLER_ID, "Sena");
    let req = TestRequest::delete().uri("/products/5");
    let (status, body) = send_request(req, &token, configure_delete).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains(r#""status":"deleted""#));
}

fn sample_product(status: ProductStatus) -> Product {
    Product {
        id: 5,
        owner_id: SELLER_ID,
        title: "Handwoven scarf".to_string(),
        description: "A warm one".to_string(),
        price: Price::from(14_999),
        stock: 8,
        status,
        created_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
    }
}

fn register(cfg: &mut ServiceConfig, db: MockMarketDb) {
    cfg.service(CatalogueRoute::<MockMarketDb>::new())
        .service(CreateProductRoute::<MockMarketDb>::new())
        .service(UpdateProductRoute::<MockMarketDb>::new())
        .service(DeleteProductRoute::<MockMarketDb>::new())
        .service(ProductRoute::<MockMarketDb>::new())
        .app_data(web::Data::new(ProductApi::new(db)));
}

fn configure_catalogue(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_catalogue().returning(|| Ok(vec![sample_product(ProductStatus::Active)]));
    register(cfg, db);
}

fn configure_product_lookup(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product(ProductStatus::Active))));
    register(cfg, db);
}

fn configure_deleted_product(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product(ProductStatus::Deleted))));
    register(cfg, db);
}

fn configure_create(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_insert_product().returning(|p| {
        let mut product = sample_product(ProductStatus::Active);
        product.owner_id = p.owner_id;
        product.title = p.title;
        Ok(product)
    });
    register(cfg, db);
}

fn configure_no_insert(cfg: &mut ServiceConfig) {
    register(cfg, MockMarketDb::new());
}

fn configure_delete(cfg: &mut ServiceConfig) {
    let mut db = MockMarketDb::new();
    db.expect_fetch_product().returning(|_| Ok(Some(sample_product(ProductStatus::Active))));
    db.expect_delete_product().returning(|_| Ok(sample_product(ProductStatus::Deleted)));
    register(cfg, db);
}
