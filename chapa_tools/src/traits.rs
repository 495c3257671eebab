use crate::{
    data_objects::{CheckoutRequest, CheckoutSession, VerificationData},
    ChapaApiError,
};

/// The seam between the HTTP layer and the payment gateway. [`crate::ChapaApi`] is the production implementation;
/// server tests substitute a mock.
#[allow(async_fn_in_trait)]
pub trait HostedCheckout {
    /// Create a hosted checkout session and return the URL the buyer must be redirected to.
    async fn initialize(&self, request: &CheckoutRequest) -> Result<CheckoutSession, ChapaApiError>;

    /// Fetch the ground-truth status of a transaction from the gateway.
    async fn verify(&self, tx_ref: &str) -> Result<VerificationData, ChapaApiError>;
}
