use std::fmt::Display;

use market_engine::db_types::{OrderStatus, TxRef};
use mkt_common::Price;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutParams {
    pub product_id: i64,
    pub quantity: i64,
}

/// The response to a successful checkout call. The client must redirect the buyer to `checkout_url` to complete
/// payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResult {
    pub order_id: i64,
    pub tx_ref: TxRef,
    pub total_price: Price,
    pub currency: String,
    pub checkout_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdateParams {
    pub status: OrderStatus,
}

/// The body of a product creation call. The owner is taken from the access token, never from the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProductParams {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    pub stock: i64,
}

/// A webhook delivery from the payment gateway. Only `tx_ref` is acted upon; the embedded status and event type are
/// logged but the verify API call is the ground truth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub tx_ref: TxRef,
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }
}
