pub mod orders;
pub mod products;
pub mod users;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    SqlitePoolOptions::new().max_connections(max_connections).connect(url).await
}
