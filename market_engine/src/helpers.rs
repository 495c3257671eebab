//! Pure transition functions for the product stock/status pair.
//!
//! `stock` and `status` mutate in lockstep: stock reaching zero demotes an active product, and restocking an
//! out-of-stock product promotes it back. `deleted` is terminal and is never touched by stock movement.

use crate::db_types::ProductStatus;

/// The status a product should hold after its stock changes to `new_stock`.
pub fn status_after_stock_change(current: ProductStatus, new_stock: i64) -> ProductStatus {
    match (current, new_stock) {
        (ProductStatus::Deleted, _) => ProductStatus::Deleted,
        (_, 0) => ProductStatus::OutOfStock,
        (ProductStatus::OutOfStock, n) if n > 0 => ProductStatus::Active,
        (status, _) => status,
    }
}
