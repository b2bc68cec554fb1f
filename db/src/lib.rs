use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgSslMode},
};
use std::{str::FromStr, sync::Arc};

pub mod error;
pub mod invite;
pub mod memory;
pub mod postgres;
pub mod referral;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod user;

pub mod models {
    pub mod invite;
    pub mod referral;
    pub mod user;
}

pub mod dtos {
    pub mod invite;
    pub mod referral;
    pub mod user;
}

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{Store, TableCounts};

/// Builds the store selected by the URL scheme of `database_url`.
///
/// - `postgres://` / `postgresql://`: creates the database if missing, runs
///   migrations and returns a pooled [`PgStore`].
/// - `memory://`: an empty [`MemoryStore`].
pub async fn setup(
    database_url: &str,
    require_ssl: bool,
) -> Result<Arc<dyn Store>, Box<dyn std::error::Error>> {
    let url = url::Url::parse(database_url)?;
    match url.scheme() {
        "postgres" | "postgresql" => {
            let pool = setup_postgres(&url, database_url, require_ssl).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        "memory" => {
            log::warn!("Using in-memory store, data will not survive a restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        scheme => Err(format!("Unsupported database scheme: {}", scheme).into()),
    }
}

async fn setup_postgres(
    url: &url::Url,
    database_url: &str,
    require_ssl: bool,
) -> Result<PgPool, Box<dyn std::error::Error>> {
    let db_name = url.path().trim_start_matches('/');
    let username = url.username();
    let password = url.password().unwrap_or("");
    let host = url.host_str().unwrap_or("localhost");
    let port = url.port().unwrap_or(5432);

    let admin_url = format!(
        "postgresql://{}:{}@{}:{}/postgres",
        username, password, host, port
    );

    let mut admin_options = PgConnectOptions::from_str(&admin_url)?;
    if require_ssl {
        admin_options = admin_options.ssl_mode(PgSslMode::Require);
    }

    let admin_pool = PgPool::connect_with(admin_options).await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(db_name)
            .fetch_one(&admin_pool)
            .await?;

    if !exists {
        log::info!("Creating database {}", db_name);
        sqlx::query(&format!("CREATE DATABASE \"{}\"", db_name))
            .execute(&admin_pool)
            .await?;
    }

    admin_pool.close().await;

    let mut options = PgConnectOptions::from_str(database_url)?;
    if require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }
    let pool = PgPool::connect_with(options).await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
