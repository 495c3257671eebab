//! Marketplace Engine
//!
//! The core of the marketplace backend: product inventory, the order lifecycle, and the stock reconciliation that
//! keeps the two honest. It is HTTP- and gateway-agnostic; the server crate wires it to actix-web and to the payment
//! gateway client.
//!
//! The crate is split into:
//! 1. Persistence ([`traits::MarketplaceDatabase`] and the SQLite implementation). Query functions take a
//!    `&mut SqliteConnection` so they compose inside transactions; the stock-affecting compound writes are atomic at
//!    the backend.
//! 2. The service layer ([`OrderFlowApi`], [`ProductApi`]): validation chains and the order state machine, generic
//!    over any backend implementing the database trait, which keeps the state machine testable against mocks.
mod api;

pub mod db_types;
pub mod helpers;
pub mod order_objects;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{OrderFlowApi, ProductApi};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{MarketplaceDatabase, MarketplaceError, Settlement};
