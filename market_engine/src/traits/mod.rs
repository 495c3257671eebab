mod data_objects;
mod marketplace_database;

pub use data_objects::Settlement;
pub use marketplace_database::{MarketplaceDatabase, MarketplaceError};
