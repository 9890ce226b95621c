//! Database connection pool

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Database connection pool type alias
pub type DbPool = PgPool;

/// Ceiling on concurrent billing connections; payment-method and
/// subscription traffic is light compared to the host application's.
const MAX_CONNECTIONS: u32 = 10;

/// Acquire timeout aligned with the gateway request timeout, so a stalled
/// pool fails in the same window as a stalled remote call.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a connection pool with the billing defaults
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}
