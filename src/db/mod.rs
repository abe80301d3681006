//! SQL statements and row loading, one module per table.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub mod answers;
pub mod match_prefs;
pub mod notification_prefs;
pub mod refresh_tokens;
pub mod users;

pub async fn connect(database_url: &str, max_connections: u32) -> sqlx::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
