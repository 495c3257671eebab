//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. For this reason, any long, non-cpu-bound operation (e.g. I/O,
//! database operations, etc.) should be expressed as futures or asynchronous functions, which get executed
//! concurrently by worker threads and thus don't block execution.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use market_engine::{
    db_types::{NewProduct, ProductUpdate},
    order_objects::OrderQueryFilter,
    MarketplaceDatabase,
    OrderFlowApi,
    ProductApi,
};

use crate::{
    auth::JwtClaims,
    data_objects::{NewProductParams, OrderStatusUpdateParams},
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name);
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Catalogue  ----------------------------------------------------

route!(catalogue => Get "/products" impl MarketplaceDatabase);
/// Public endpoint listing every active product, newest first. No authentication required.
pub async fn catalogue<B: MarketplaceDatabase>(api: web::Data<ProductApi<B>>) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET catalogue");
    let products = api.catalogue().await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(product => Get "/products/{id}" impl MarketplaceDatabase);
/// Public endpoint for a single product. Deleted products are indistinguishable from ones that never existed.
pub async fn product<B: MarketplaceDatabase>(
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    debug!("💻️ GET product {product_id}");
    let product = api.product(product_id).await?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Products  ----------------------------------------------------

route!(create_product => Post "/products" impl MarketplaceDatabase);
/// Create a new product listing, owned by the authenticated user.
pub async fn create_product<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<NewProductParams>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let NewProductParams { title, description, price, stock } = body.into_inner();
    debug!("💻️ POST create product '{title}' for user {}", claims.user_id());
    let product = NewProduct { owner_id: claims.user_id(), title, description, price, stock };
    let product = api.create_product(product).await?;
    Ok(HttpResponse::Created().json(product))
}

route!(my_products => Get "/my/products" impl MarketplaceDatabase);
/// List the authenticated user's own products, including out-of-stock ones (but not deleted ones).
pub async fn my_products<B: MarketplaceDatabase>(
    claims: JwtClaims,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_products for user {}", claims.user_id());
    let products = api.products_for_owner(claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(products))
}

route!(update_product => Patch "/products/{id}" impl MarketplaceDatabase);
/// Partial update of a product. Only the owner may call this. A stock change may flip the product between
/// `out_of_stock` and `active`.
pub async fn update_product<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<ProductUpdate>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    let update = body.into_inner();
    debug!("💻️ PATCH product {product_id} by user {}", claims.user_id());
    let product = api.update_product(product_id, claims.user_id(), update).await?;
    Ok(HttpResponse::Ok().json(product))
}

route!(delete_product => Delete "/products/{id}" impl MarketplaceDatabase);
/// Soft-delete a product. The listing disappears from the catalogue; historical orders keep pointing at the row.
pub async fn delete_product<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<ProductApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let product_id = path.into_inner();
    info!("💻️ DELETE product {product_id} by user {}", claims.user_id());
    let product = api.delete_product(product_id, claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(product))
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(my_orders => Get "/orders" impl MarketplaceDatabase);
/// The authenticated user's purchases, newest first. Supports an optional `?status=` filter.
pub async fn my_orders<B: MarketplaceDatabase>(
    claims: JwtClaims,
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner();
    debug!("💻️ GET my_orders for user {} [{filter}]", claims.user_id());
    let orders = api.orders_for_buyer(claims.user_id(), filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(my_sales => Get "/sales" impl MarketplaceDatabase);
/// Orders placed against any of the authenticated user's products, newest first. Supports `?status=`.
pub async fn my_sales<B: MarketplaceDatabase>(
    claims: JwtClaims,
    query: web::Query<OrderQueryFilter>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let filter = query.into_inner();
    debug!("💻️ GET my_sales for user {} [{filter}]", claims.user_id());
    let orders = api.orders_for_owner(claims.user_id(), filter).await?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_id => Get "/orders/{id}" impl MarketplaceDatabase);
/// Fetch a single order. Only the buyer and the owner of the product may see it. A missing order is a 404 for
/// everyone; an existing order viewed by a third party is a 403.
pub async fn order_by_id<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for user {}", claims.user_id());
    let order = api.order_for_viewer(order_id, claims.user_id()).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Patch "/orders/{id}/status" impl MarketplaceDatabase);
/// Manual status correction by the product owner. Setting a `successful` order to `failed` restores the debited
/// stock.
pub async fn update_order_status<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<i64>,
    body: web::Json<OrderStatusUpdateParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let OrderStatusUpdateParams { status } = body.into_inner();
    info!("💻️ PATCH order {order_id} status to {status} by user {}", claims.user_id());
    let order = api.update_status(order_id, claims.user_id(), status).await?;
    Ok(HttpResponse::Ok().json(order))
}
