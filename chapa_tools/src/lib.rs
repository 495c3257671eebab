//! A thin client for the Chapa payment gateway.
//!
//! Two endpoints are consumed:
//! * `POST /transaction/initialize` — create a hosted checkout session for an amount and transaction reference, and
//!   get back the URL the buyer must be redirected to.
//! * `GET /transaction/verify/{tx_ref}` — ask the gateway what actually happened to a transaction. Webhook payloads
//!   embed a status field, but the verify call is the ground truth.
//!
//! The webhook signing secret is shared with the gateway out of band and is consumed by the server crate, not here.
mod api;
mod config;
pub mod data_objects;
mod error;
mod traits;

pub use api::ChapaApi;
pub use config::ChapaConfig;
pub use data_objects::{CheckoutRequest, CheckoutSession, PaymentStatus, VerificationData};
pub use error::ChapaApiError;
pub use traits::HostedCheckout;
