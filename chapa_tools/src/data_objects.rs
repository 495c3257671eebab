use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The body of a `transaction/initialize` call.
///
/// Chapa expects the amount as a decimal string, so callers format their [`mkt_common::Price`] with `to_string()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub amount: String,
    pub currency: String,
    pub email: String,
    pub first_name: String,
    pub tx_ref: String,
    pub callback_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customization: Option<Customization>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customization {
    pub title: String,
    pub description: String,
}

/// A successful `transaction/initialize` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub checkout_url: String,
}

/// The gateway-side status of a payment attempt, as reported by the verify endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Pending,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Pending => write!(f, "pending"),
            PaymentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Ground-truth data for a transaction, returned by `transaction/verify/{tx_ref}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationData {
    pub status: PaymentStatus,
    pub amount: String,
    pub currency: String,
    pub tx_ref: String,
}

impl VerificationData {
    pub fn is_successful(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

/// Every gateway response carries this envelope; `data` holds the endpoint-specific payload.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayEnvelope<T> {
    pub status: String,
    pub message: String,
    pub data: Option<T>,
}
