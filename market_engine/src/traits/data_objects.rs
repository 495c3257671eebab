use crate::db_types::Order;

/// The outcome of a webhook-driven settlement attempt for a transaction reference.
#[derive(Debug, Clone)]
pub enum Settlement {
    /// The order moved from `Pending` to `Successful` and the product stock was debited.
    Completed(Order),
    /// The order had already been resolved. Nothing was changed; safe for re-delivered webhooks.
    AlreadyFinal(Order),
    /// Payment was confirmed, but stock moved since checkout and can no longer cover the order. The order has been
    /// marked `Failed`; the payment needs a manual refund.
    StockShortfall { order: Order, available: i64, requested: i64 },
}
