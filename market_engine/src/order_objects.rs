use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::db_types::OrderStatus;

/// Query-string filter for the order listing endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueryFilter {
    pub status: Option<OrderStatus>,
}

impl OrderQueryFilter {
    pub fn with_status(status: OrderStatus) -> Self {
        Self { status: Some(status) }
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            Some(s) => write!(f, "status={s}"),
            None => write!(f, "no filter"),
        }
    }
}
