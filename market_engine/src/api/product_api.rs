use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewProduct, Product, ProductStatus, ProductUpdate},
    traits::{MarketplaceDatabase, MarketplaceError},
};

/// Owner-facing product CRUD. Stock bookkeeping on the order path goes through
/// [`crate::OrderFlowApi`]; this API covers listing management and manual restocks.
pub struct ProductApi<B> {
    db: B,
}

impl<B> Debug for ProductApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProductApi")
    }
}

impl<B> ProductApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> ProductApi<B>
where B: MarketplaceDatabase
{
    pub async fn create_product(&self, product: NewProduct) -> Result<Product, MarketplaceError> {
        if product.price.value() < 0 {
            return Err(MarketplaceError::InvalidProduct(format!("price may not be negative ({})", product.price)));
        }
        if product.stock < 0 {
            return Err(MarketplaceError::InvalidProduct(format!("stock may not be negative ({})", product.stock)));
        }
        if product.title.trim().is_empty() {
            return Err(MarketplaceError::InvalidProduct("title may not be empty".to_string()));
        }
        let product = self.db.insert_product(product).await?;
        debug!("🏷️ Product {} ({}) created by user {}", product.id, product.title, product.owner_id);
        Ok(product)
    }

    /// Fetch a single product. Deleted products are invisible here — they only surface through historical orders.
    pub async fn product(&self, product_id: i64) -> Result<Product, MarketplaceError> {
        let product = self.db.fetch_product(product_id).await?.ok_or(MarketplaceError::ProductNotFound(product_id))?;
        if product.status == ProductStatus::Deleted {
            return Err(MarketplaceError::ProductNotFound(product_id));
        }
        Ok(product)
    }

    pub async fn catalogue(&self) -> Result<Vec<Product>, MarketplaceError> {
        self.db.fetch_catalogue().await
    }

    pub async fn products_for_owner(&self, owner_id: i64) -> Result<Vec<Product>, MarketplaceError> {
        self.db.fetch_products_for_owner(owner_id).await
    }

    /// Apply a partial update on behalf of `acting_user`, who must own the product. A stock change triggers the
    /// status recomputation in the backend (zero stock → `out_of_stock`, positive restock → `active`).
    pub async fn update_product(
        &self,
        product_id: i64,
        acting_user: i64,
        update: ProductUpdate,
    ) -> Result<Product, MarketplaceError> {
        if let Some(price) = update.price {
            if price.value() < 0 {
                return Err(MarketplaceError::InvalidProduct(format!("price may not be negative ({price})")));
            }
        }
        if let Some(stock) = update.stock {
            if stock < 0 {
                return Err(MarketplaceError::InvalidProduct(format!("stock may not be negative ({stock})")));
            }
        }
        let product = self.owned_product(product_id, acting_user).await?;
        if product.status == ProductStatus::Deleted {
            return Err(MarketplaceError::ProductNoLongerAvailable(product_id));
        }
        let updated = self.db.update_product(product_id, update).await?;
        debug!("🏷️ Product {} updated; stock={}, status={}", updated.id, updated.stock, updated.status);
        Ok(updated)
    }

    /// Soft delete. The status flip is terminal; the row stays behind for past orders.
    pub async fn delete_product(&self, product_id: i64, acting_user: i64) -> Result<Product, MarketplaceError> {
        let product = self.owned_product(product_id, acting_user).await?;
        if product.status == ProductStatus::Deleted {
            return Ok(product);
        }
        let deleted = self.db.delete_product(product_id).await?;
        info!("🏷️ Product {} ({}) soft-deleted by user {acting_user}", deleted.id, deleted.title);
        Ok(deleted)
    }

    async fn owned_product(&self, product_id: i64, acting_user: i64) -> Result<Product, MarketplaceError> {
        let product = self.db.fetch_product(product_id).await?.ok_or(MarketplaceError::ProductNotFound(product_id))?;
        if product.owner_id != acting_user {
            debug!("🏷️ User {acting_user} tried to modify product {product_id} owned by {}", product.owner_id);
            return Err(MarketplaceError::PermissionDenied(format!(
                "Only the owner may modify product {product_id}"
            )));
        }
        Ok(product)
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
