//----------------------------------------------   Checkout  ----------------------------------------------------

use actix_web::{web, HttpResponse};
use chapa_tools::{CheckoutRequest, HostedCheckout};
use log::*;
use market_engine::{MarketplaceDatabase, OrderFlowApi};
use mkt_common::CURRENCY_CODE;

use crate::{
    auth::JwtClaims,
    config::ServerConfig,
    data_objects::{CheckoutParams, CheckoutResult, JsonResponse, WebhookEvent},
    errors::ServerError,
    route,
};

route!(checkout => Post "/checkout" impl MarketplaceDatabase, HostedCheckout);
/// Create an order and a hosted checkout session for it.
///
/// The order is created first, in the `pending` state, with the freshly generated transaction reference. Then the
/// gateway is asked for a checkout session. If that call fails the order is immediately marked `failed` so no
/// orphaned pending order lingers, and the buyer gets a generic payment failure.
pub async fn checkout<B, G>(
    claims: JwtClaims,
    body: web::Json<CheckoutParams>,
    api: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<G>,
    config: web::Data<ServerConfig>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase,
    G: HostedCheckout,
{
    let CheckoutParams { product_id, quantity } = body.into_inner();
    let buyer_id = claims.user_id();
    debug!("💻️ Checkout request from user {buyer_id} for {quantity} x product {product_id}");
    let (buyer, order) = api.checkout_with_buyer(buyer_id, product_id, quantity).await?;
    let request = CheckoutRequest {
        amount: order.total_price.to_string(),
        currency: CURRENCY_CODE.to_string(),
        email: buyer.email.clone(),
        first_name: buyer.name.clone(),
        tx_ref: order.tx_ref.to_string(),
        callback_url: config.callback_url.clone(),
        customization: None,
    };
    let session = match gateway.initialize(&request).await {
        Ok(session) => session,
        Err(e) => {
            warn!("💻️ Could not create a checkout session for order #{}. {e}", order.id);
            if let Err(e) = api.abandon_order(order.id).await {
                error!("💻️ Could not mark order #{} as failed after the gateway error. {e}", order.id);
            }
            return Err(ServerError::PaymentInitializationFailed);
        },
    };
    info!("💻️ Order #{} created; buyer {buyer_id} redirected to checkout for tx_ref {}", order.id, order.tx_ref);
    let result = CheckoutResult {
        order_id: order.id,
        tx_ref: order.tx_ref,
        total_price: order.total_price,
        currency: CURRENCY_CODE.to_string(),
        checkout_url: session.checkout_url,
    };
    Ok(HttpResponse::Created().json(result))
}

route!(chapa_webhook => Post "/chapa" impl MarketplaceDatabase, HostedCheckout);
/// Payment webhook from the gateway. The HMAC middleware has already authenticated the delivery.
///
/// The payload's embedded status is never trusted; the gateway's verify endpoint is called and only a confirmed
/// payment settles the order. Settlement is idempotent, so replayed deliveries are harmless. A confirmed payment
/// whose stock ran out between checkout and now leaves the order `failed` and is reported as a 400; the payment
/// then needs a manual refund.
pub async fn chapa_webhook<B, G>(
    body: web::Json<WebhookEvent>,
    api: web::Data<OrderFlowApi<B>>,
    gateway: web::Data<G>,
) -> Result<HttpResponse, ServerError>
where
    B: MarketplaceDatabase,
    G: HostedCheckout,
{
    let event = body.into_inner();
    let tx_ref = event.tx_ref.clone();
    info!(
        "💻️ Webhook received for tx_ref {tx_ref} (event: {}, reported status: {})",
        event.event.as_deref().unwrap_or("-"),
        event.status.as_deref().unwrap_or("-")
    );
    let verification = gateway.verify(tx_ref.as_str()).await.map_err(|e| {
        warn!("💻️ Could not verify transaction {tx_ref} with the gateway. {e}");
        ServerError::PaymentNotConfirmed
    })?;
    if !verification.is_successful() {
        info!("💻️ Transaction {tx_ref} is not successful at the gateway ({}). No action taken.", verification.status);
        return Err(ServerError::PaymentNotConfirmed);
    }
    let order = api.finalize_order(&tx_ref).await.map_err(|e| {
        warn!("💻️ Could not settle order for tx_ref {tx_ref}. {e}");
        ServerError::from(e)
    })?;
    info!("💻️ Order #{} settled via webhook ({}).", order.id, order.status);
    Ok(HttpResponse::Ok().json(JsonResponse::success(format!("Order #{} is {}", order.id, order.status))))
}
