use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

pub use mkt_common::Price;

//--------------------------------------        User        ----------------------------------------------------------
/// A minimal view of a user account. Credential storage and token issuance live outside this crate; orders only need
/// to know that the buyer exists and what to call them at checkout.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    ProductStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// The product is listed and purchasable.
    Active,
    /// Stock has run out. The listing stays visible but checkout is refused.
    OutOfStock,
    /// The product has been soft-deleted. Terminal; the row is kept for historical orders.
    Deleted,
}

impl Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductStatus::Active => write!(f, "active"),
            ProductStatus::OutOfStock => write!(f, "out_of_stock"),
            ProductStatus::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("Invalid status: {0}")]
pub struct StatusConversionError(pub String);

impl FromStr for ProductStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "out_of_stock" => Ok(Self::OutOfStock),
            "deleted" => Ok(Self::Deleted),
            s => Err(StatusConversionError(format!("Invalid product status: {s}"))),
        }
    }
}

//--------------------------------------       Product       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub stock: i64,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Availability is derived, never stored. `status` is the authoritative field.
    pub fn is_available(&self) -> bool {
        self.status == ProductStatus::Active && self.stock > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProduct {
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub price: Price,
    pub stock: i64,
}

/// A partial update to a product. Empty fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.price.is_none() && self.stock.is_none()
    }
}

//--------------------------------------     OrderStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// The order exists and a checkout session has been (or is being) created. No stock is reserved.
    Pending,
    /// Payment confirmed and stock debited.
    Successful,
    /// Payment failed, stock ran out at verification time, or the owner voided the order.
    Failed,
}

impl OrderStatus {
    /// An order leaves `Pending` exactly once under the normal flow.
    pub fn is_final(&self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "pending"),
            OrderStatus::Successful => write!(f, "successful"),
            OrderStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for OrderStatus {
    type Err = StatusConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "successful" => Ok(Self::Successful),
            "failed" => Ok(Self::Failed),
            s => Err(StatusConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------        TxRef        ---------------------------------------------------------
/// The transaction reference correlating an order with a gateway payment attempt. Generated once at checkout,
/// immutable thereafter, and unique across all orders (enforced by the store).
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct TxRef(pub String);

impl TxRef {
    /// Generate a fresh, globally unique reference.
    pub fn generate() -> Self {
        Self(format!("mkt-{:016x}-{:08x}", rand::random::<u64>(), rand::random::<u32>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TxRef {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for TxRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for TxRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Nullable: orders survive buyer account loss.
    pub buyer_id: Option<i64>,
    pub product_id: i64,
    pub quantity: i64,
    /// Snapshot of `price × quantity` at creation time. Never recomputed.
    pub total_price: Price,
    pub tx_ref: TxRef,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//--------------------------------------       NewOrder      ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub buyer_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub total_price: Price,
    pub tx_ref: TxRef,
}

impl NewOrder {
    pub fn new(buyer_id: i64, product_id: i64, quantity: i64, total_price: Price) -> Self {
        Self { buyer_id, product_id, quantity, total_price, tx_ref: TxRef::generate() }
    }
}
