use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::str::FromStr;
use std::time::Duration;

/// Statements slower than this are logged at warn
const SLOW_STATEMENT: Duration = Duration::from_secs(2);

/// Connection pool for the account and history tables
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let connect_options = PgConnectOptions::from_str(database_url)?
        .application_name("medbill-analyzer")
        .log_slow_statements(tracing::log::LevelFilter::Warn, SLOW_STATEMENT);

    let pool = PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await?;

    tracing::debug!("Postgres pool ready ({} connections max)", max_connections.max(1));
    Ok(pool)
}
