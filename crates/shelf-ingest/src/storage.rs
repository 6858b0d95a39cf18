// Storage layer for best-seller products
//
// A single PostgreSQL connection owned for the whole run. Each batch is
// written inside one transaction so a failed row leaves no partial writes.

use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;
use tracing::{debug, info, warn};

use crate::config::DatabaseConfig;
use crate::error::StorageError;
use crate::staging::TabularBatch;

/// Target table
pub const PRODUCTS_TABLE: &str = "amazon_products";

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS amazon_products (
        product_title TEXT,
        product_price TEXT,
        product_star_rating TEXT,
        product_num_ratings INTEGER,
        product_url TEXT PRIMARY KEY,
        product_picture TEXT,
        product_rank_change_label TEXT
    )
"#;

// Title and picture keep their first stored value on conflict.
const UPSERT_SQL: &str = r#"
    INSERT INTO amazon_products (
        product_title, product_price, product_star_rating, product_num_ratings,
        product_url, product_picture, product_rank_change_label
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7)
    ON CONFLICT (product_url) DO UPDATE SET
        product_price = EXCLUDED.product_price,
        product_star_rating = EXCLUDED.product_star_rating,
        product_num_ratings = EXCLUDED.product_num_ratings,
        product_rank_change_label = EXCLUDED.product_rank_change_label
"#;

/// Persistence gateway for the products table
pub struct ProductStore {
    conn: PgConnection,
}

impl std::fmt::Debug for ProductStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductStore").finish_non_exhaustive()
    }
}

impl ProductStore {
    /// Open the run's database connection
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.name);

        debug!(host = %config.host, port = config.port, database = %config.name, "Connecting to database");

        let conn = tokio::time::timeout(config.connect_timeout(), PgConnection::connect_with(&options))
            .await
            .map_err(|_| {
                StorageError::Connect(sqlx::Error::Io(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    format!("no connection after {}s", config.connect_timeout_secs),
                )))
            })?
            .map_err(StorageError::Connect)?;

        info!(host = %config.host, database = %config.name, "Database connection successful");

        Ok(Self::from_connection(conn))
    }

    /// Wrap an already open connection
    pub fn from_connection(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// Create the products table if it does not exist yet
    pub async fn ensure_schema(&mut self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&mut self.conn)
            .await
            .map_err(StorageError::Schema)?;

        info!(table = PRODUCTS_TABLE, "Table ready");
        Ok(())
    }

    /// Insert or refresh every staged row in a single transaction
    ///
    /// Rows are applied in staging order, so a URL repeated within the batch
    /// ends up with the values of its last occurrence (title and picture
    /// excepted). Returns the number of rows written.
    pub async fn upsert(&mut self, batch: &TabularBatch) -> Result<u64, StorageError> {
        if batch.is_empty() {
            debug!("Nothing to upsert");
            return Ok(0);
        }

        let mut tx = self.conn.begin().await.map_err(StorageError::Write)?;
        let mut written = 0u64;

        for row in batch.rows() {
            let result = sqlx::query(UPSERT_SQL)
                .bind(row.product_title)
                .bind(row.product_price)
                .bind(row.star_rating_text())
                .bind(row.product_num_ratings)
                .bind(row.product_url)
                .bind(row.product_picture)
                .bind(row.product_rank_change_label)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::Write)?;

            written += result.rows_affected();
        }

        // Dropping `tx` on the error paths above rolls the batch back.
        tx.commit().await.map_err(StorageError::Write)?;

        info!(rows = written, table = PRODUCTS_TABLE, "Data inserted or updated successfully");
        Ok(written)
    }

    /// Close the connection, logging rather than returning a failure
    pub async fn close(self) {
        if let Err(e) = self.conn.close().await {
            warn!(error = %e, "Failed to close database connection cleanly");
        } else {
            debug!("Database connection closed");
        }
    }
}
