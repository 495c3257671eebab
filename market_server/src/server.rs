use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use chapa_tools::ChapaApi;
use market_engine::{OrderFlowApi, ProductApi, SqliteDatabase};

use crate::{
    auth::TokenIssuer,
    checkout_routes::{ChapaWebhookRoute, CheckoutRoute},
    config::ServerConfig,
    errors::ServerError,
    middleware::HmacMiddlewareFactory,
    routes::{
        health,
        CatalogueRoute,
        CreateProductRoute,
        DeleteProductRoute,
        MyOrdersRoute,
        MyProductsRoute,
        MySalesRoute,
        OrderByIdRoute,
        ProductRoute,
        UpdateOrderStatusRoute,
        UpdateProductRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = ChapaApi::new(config.chapa.clone()).map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: ChapaApi,
) -> Result<Server, ServerError> {
    let host = config.host.clone();
    let port = config.port;
    let srv = HttpServer::new(move || {
        let orders_api = OrderFlowApi::new(db.clone());
        let products_api = ProductApi::new(db.clone());
        let token_issuer = TokenIssuer::new(&config.auth);
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("mkt::access_log"))
            .app_data(web::Data::new(orders_api))
            .app_data(web::Data::new(products_api))
            .app_data(web::Data::new(gateway.clone()))
            .app_data(web::Data::new(token_issuer))
            .app_data(web::Data::new(config.clone()));
        // Buyer and seller endpoints; every handler in here extracts JwtClaims and thus requires a valid token
        let api_scope = web::scope("/api")
            .service(CheckoutRoute::<SqliteDatabase, ChapaApi>::new())
            .service(CreateProductRoute::<SqliteDatabase>::new())
            .service(MyProductsRoute::<SqliteDatabase>::new())
            .service(UpdateProductRoute::<SqliteDatabase>::new())
            .service(DeleteProductRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(MySalesRoute::<SqliteDatabase>::new())
            .service(UpdateOrderStatusRoute::<SqliteDatabase>::new())
            .service(OrderByIdRoute::<SqliteDatabase>::new());
        // Gateway callbacks must carry a valid HMAC signature over the raw body
        let webhook_scope = web::scope("/webhook")
            .wrap(HmacMiddlewareFactory::new(
                "Chapa-Signature",
                config.webhook_secret.clone(),
                !config.disable_webhook_signature,
            ))
            .service(ChapaWebhookRoute::<SqliteDatabase, ChapaApi>::new());
        app.service(health)
            .service(api_scope)
            .service(webhook_scope)
            .service(CatalogueRoute::<SqliteDatabase>::new())
            .service(ProductRoute::<SqliteDatabase>::new())
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}
