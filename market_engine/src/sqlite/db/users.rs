use sqlx::SqliteConnection;

use crate::db_types::User;

pub async fn fetch_user_by_id(user_id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(user_id).fetch_optional(conn).await?;
    Ok(user)
}

/// Account provisioning proper lives outside this crate; this insert exists for seeding and tests.
pub async fn insert_user(name: &str, email: &str, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    let user = sqlx::query_as("INSERT INTO users (name, email) VALUES ($1, $2) RETURNING *")
        .bind(name)
        .bind(email)
        .fetch_one(conn)
        .await?;
    Ok(user)
}
