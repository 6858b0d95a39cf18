//! Shared helpers for shelf-ingest integration tests
//!
//! The listing API is always served by `wiremock`. Database tests start a
//! throwaway PostgreSQL container through `testcontainers` and are marked
//! `#[ignore = "requires Docker"]`:
//!
//! ```bash
//! cargo test -p shelf-ingest -- --ignored --nocapture
//! ```

#![allow(dead_code)]

use anyhow::{Context, Result};
use serde_json::{json, Value};
use shelf_ingest::config::{ApiConfig, Config, DatabaseConfig};
use testcontainers::{core::IntoContainerPort, runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tracing::info;

pub const TEST_API_KEY: &str = "test-api-key";

/// Initialise tracing once for the test binary
pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shelf_ingest=debug,sqlx=warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Database settings pointing at a port nothing listens on
pub fn unreachable_database() -> DatabaseConfig {
    DatabaseConfig {
        host: "127.0.0.1".to_string(),
        port: 1,
        user: "nobody".to_string(),
        password: "nothing".to_string(),
        name: "none".to_string(),
        connect_timeout_secs: 2,
    }
}

/// Config whose listing endpoint is `listing_url`
pub fn test_config(listing_url: String, database: DatabaseConfig) -> Config {
    Config {
        api: ApiConfig {
            listing_url,
            api_key: TEST_API_KEY.to_string(),
            api_host: "listing.test".to_string(),
            timeout_secs: 5,
        },
        database,
    }
}

/// A listing document wrapping `entries`
pub fn listing_doc(entries: Vec<Value>) -> Value {
    json!({
        "status": "OK",
        "request_id": "test-request",
        "data": {
            "category": "videogames",
            "best_sellers": entries
        }
    })
}

/// The "Game A" entry, with a caller-chosen price
pub fn game_a(price: &str) -> Value {
    json!({
        "rank": 1,
        "asin": "B0A",
        "product_title": "Game A",
        "product_price": price,
        "product_star_rating": "4.5",
        "product_num_ratings": "120",
        "product_url": "http://x/A",
        "product_photo": "http://img/A",
        "rank_change_label": "+1"
    })
}

// ============================================================================
// PostgreSQL Test Container
// ============================================================================

/// Running PostgreSQL container plus matching connection settings
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    database: DatabaseConfig,
}

impl TestPostgres {
    pub async fn start() -> Result<Self> {
        info!("Starting PostgreSQL test container...");

        let container = Postgres::default()
            .with_tag("16-alpine")
            .start()
            .await
            .context("Failed to start PostgreSQL container")?;

        let host = container
            .get_host()
            .await
            .context("Failed to get container host")?;
        let port = container
            .get_host_port_ipv4(5432.tcp())
            .await
            .context("Failed to get container port")?;

        Ok(Self {
            _container: container,
            database: DatabaseConfig {
                host: host.to_string(),
                port,
                user: "postgres".to_string(),
                password: "postgres".to_string(),
                name: "postgres".to_string(),
                connect_timeout_secs: 30,
            },
        })
    }

    pub fn database(&self) -> DatabaseConfig {
        self.database.clone()
    }

    /// Separate connection for assertions
    pub async fn connect(&self) -> Result<sqlx::PgConnection> {
        use sqlx::Connection;

        let url = format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.database.user,
            self.database.password,
            self.database.host,
            self.database.port,
            self.database.name
        );
        sqlx::PgConnection::connect(&url)
            .await
            .context("Failed to connect to PostgreSQL")
    }
}

/// Stored product row as read back from the table
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredProduct {
    pub product_title: Option<String>,
    pub product_price: Option<String>,
    pub product_star_rating: Option<String>,
    pub product_num_ratings: Option<i32>,
    pub product_url: String,
    pub product_picture: Option<String>,
    pub product_rank_change_label: Option<String>,
}

pub async fn stored_products(conn: &mut sqlx::PgConnection) -> Result<Vec<StoredProduct>> {
    sqlx::query_as::<_, StoredProduct>(
        "SELECT product_title, product_price, product_star_rating, product_num_ratings, \
         product_url, product_picture, product_rank_change_label \
         FROM amazon_products ORDER BY product_url",
    )
    .fetch_all(conn)
    .await
    .context("Failed to read amazon_products")
}
