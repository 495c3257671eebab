//! # Marketplace server
//! This crate hosts the HTTP layer of the marketplace backend. It is responsible for:
//! * Serving the product catalogue and owner product management endpoints.
//! * Creating orders and handing buyers off to the Chapa hosted checkout page.
//! * Receiving and verifying payment webhooks from the gateway, and settling orders against inventory.
//! * Buyer/seller order queries and owner-driven order status corrections.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! * `/health`: liveness check, returns 200.
//! * `/products`, `/products/{id}`: public catalogue reads.
//! * `/api/...`: authenticated buyer and seller endpoints (bearer JWT).
//! * `/webhook/chapa`: the payment gateway callback, guarded by an HMAC signature check.

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;

pub mod checkout_routes;
pub mod helpers;
pub mod middleware;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
