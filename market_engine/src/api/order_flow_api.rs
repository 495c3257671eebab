use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderStatus, Product, ProductStatus, User},
    order_objects::OrderQueryFilter,
    traits::{MarketplaceDatabase, MarketplaceError, Settlement},
};

/// `OrderFlowApi` drives the order lifecycle: checkout creation, webhook-driven settlement, and owner-initiated
/// status corrections. It holds no state beyond the backend; all multi-row writes are delegated to the backend so
/// that they run atomically.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: MarketplaceDatabase
{
    /// Create a new `pending` order for a buyer.
    ///
    /// Validation happens in a fixed sequence: the buyer must exist, the product must exist, it must not be deleted,
    /// it must be exactly `active`, and its stock must cover the requested quantity. No stock is reserved here —
    /// stock is only debited when the payment is confirmed via [`Self::finalize_order`].
    ///
    /// The total price is computed as `unit price × quantity` and frozen on the order; later product price changes
    /// do not affect it. A fresh transaction reference is generated for the gateway handoff.
    pub async fn checkout(&self, buyer_id: i64, product_id: i64, quantity: i64) -> Result<Order, MarketplaceError> {
        let (_, order) = self.checkout_with_buyer(buyer_id, product_id, quantity).await?;
        Ok(order)
    }

    /// [`Self::checkout`], but also handing back the buyer row. Callers that need the buyer's contact details for
    /// the gateway handoff get them from the same lookup that validated the buyer's existence.
    pub async fn checkout_with_buyer(
        &self,
        buyer_id: i64,
        product_id: i64,
        quantity: i64,
    ) -> Result<(User, Order), MarketplaceError> {
        if quantity < 1 {
            return Err(MarketplaceError::InvalidQuantity(quantity));
        }
        let buyer = self.db.fetch_user(buyer_id).await?.ok_or(MarketplaceError::UserNotFound(buyer_id))?;
        let product = self.db.fetch_product(product_id).await?.ok_or(MarketplaceError::ProductNotFound(product_id))?;
        if product.status == ProductStatus::Deleted {
            return Err(MarketplaceError::ProductNoLongerAvailable(product_id));
        }
        if product.status != ProductStatus::Active {
            return Err(MarketplaceError::ProductNotActive { product_id, status: product.status });
        }
        if product.stock < quantity {
            return Err(MarketplaceError::InsufficientStock {
                product_id,
                available: product.stock,
                requested: quantity,
            });
        }
        let total_price = product.price.checked_mul(quantity).ok_or(MarketplaceError::InvalidQuantity(quantity))?;
        let order = self.db.insert_order(NewOrder::new(buyer.id, product.id, quantity, total_price)).await?;
        debug!("🛒️ Order #{} created for buyer {} with tx_ref {}", order.id, buyer.id, order.tx_ref);
        Ok((buyer, order))
    }

    /// Compensating write used when the gateway call after order creation fails: the just-created order is marked
    /// `failed` so that no orphaned `pending` order lingers without a corresponding payment attempt.
    pub async fn abandon_order(&self, order_id: i64) -> Result<Order, MarketplaceError> {
        warn!("🛒️ Abandoning order #{order_id} after a failed gateway handoff");
        self.db.update_order_status(order_id, OrderStatus::Failed).await
    }

    /// Resolve an order once the gateway has confirmed its payment.
    ///
    /// Re-delivered webhooks are harmless: an already-resolved order is returned unchanged. A confirmed payment for
    /// which stock has run out in the meantime marks the order `failed` and surfaces
    /// [`MarketplaceError::StockExhaustedAfterPayment`] — this system does not automate refunds.
    pub async fn finalize_order(&self, tx_ref: &crate::db_types::TxRef) -> Result<Order, MarketplaceError> {
        match self.db.settle_order(tx_ref).await? {
            Settlement::Completed(order) => {
                info!("🛒️ Order #{} settled successfully for tx_ref {tx_ref}", order.id);
                Ok(order)
            },
            Settlement::AlreadyFinal(order) => {
                info!("🛒️ Order #{} was already {}; webhook re-delivery ignored", order.id, order.status);
                Ok(order)
            },
            Settlement::StockShortfall { order, available, requested } => {
                warn!(
                    "🛒️ Payment confirmed for order #{} but stock ran out ({available} < {requested}). Order marked \
                     as failed; manual refund required.",
                    order.id
                );
                Err(MarketplaceError::StockExhaustedAfterPayment { order_id: order.id, available, requested })
            },
        }
    }

    /// Owner-driven manual status transition.
    ///
    /// Only the owner of the *product* may change an order's status. Any target status is accepted. Exactly one
    /// transition carries an inventory side effect: `successful → failed` restores the order quantity to the product
    /// stock (and an `out_of_stock` product with positive stock again becomes `active`). Everything else is a bare
    /// status write.
    pub async fn update_status(
        &self,
        order_id: i64,
        acting_user: i64,
        new_status: OrderStatus,
    ) -> Result<Order, MarketplaceError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(MarketplaceError::OrderNotFound(order_id))?;
        let product = self.fetch_linked_product(&order).await?;
        if product.owner_id != acting_user {
            debug!("🛒️ User {acting_user} tried to modify order #{order_id} they do not own");
            return Err(MarketplaceError::PermissionDenied(format!(
                "Only the owner of product {} may update this order",
                product.id
            )));
        }
        if order.status == OrderStatus::Successful && new_status == OrderStatus::Failed {
            info!("🛒️ Reverting order #{order_id}: restoring {} units to product {}", order.quantity, product.id);
            return self.db.revert_order(order_id).await;
        }
        self.db.update_order_status(order_id, new_status).await
    }

    /// Single-order lookup, permitted for the buyer or the owning product's owner.
    ///
    /// A missing order is `OrderNotFound`; an existing order viewed by anyone else is `PermissionDenied`. That
    /// ordering is deliberate and fixed.
    pub async fn order_for_viewer(&self, order_id: i64, viewer_id: i64) -> Result<Order, MarketplaceError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(MarketplaceError::OrderNotFound(order_id))?;
        if order.buyer_id == Some(viewer_id) {
            return Ok(order);
        }
        let product = self.fetch_linked_product(&order).await?;
        if product.owner_id == viewer_id {
            return Ok(order);
        }
        Err(MarketplaceError::PermissionDenied("You are neither the buyer nor the seller of this order".to_string()))
    }

    pub async fn orders_for_buyer(
        &self,
        buyer_id: i64,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, MarketplaceError> {
        self.db.fetch_orders_for_buyer(buyer_id, filter).await
    }

    pub async fn orders_for_owner(
        &self,
        owner_id: i64,
        filter: OrderQueryFilter,
    ) -> Result<Vec<Order>, MarketplaceError> {
        self.db.fetch_orders_for_owner(owner_id, filter).await
    }

    async fn fetch_linked_product(&self, order: &Order) -> Result<Product, MarketplaceError> {
        // Products are soft-deleted only, so this join must always resolve.
        self.db.fetch_product(order.product_id).await?.ok_or_else(|| {
            error!("🛒️ Order #{} references product {} which does not exist", order.id, order.product_id);
            MarketplaceError::ProductNotFound(order.product_id)
        })
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
