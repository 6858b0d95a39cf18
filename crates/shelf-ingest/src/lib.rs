//! Shelf Ingest Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pulls the best-sellers listing from the product data API and upserts it
//! into the `amazon_products` table.
//!
//! # Pipeline
//!
//! - **listing**: HTTP fetch and quota probe
//! - **normalizer**: JSON entries → [`models::ProductRecord`]
//! - **staging**: records → columnar [`staging::TabularBatch`]
//! - **storage**: schema creation and transactional upsert
//! - **pipeline**: the state machine tying them together
//!
//! # Example
//!
//! ```no_run
//! use shelf_ingest::config::{Config, ListingRequest};
//! use shelf_ingest::pipeline::{Pipeline, RunOptions};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let mut pipeline = Pipeline::new(&config, ListingRequest::default(), RunOptions::default())?;
//!     let outcome = pipeline.run().await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod listing;
pub mod models;
pub mod normalizer;
pub mod pipeline;
pub mod staging;
pub mod storage;

pub use error::{FetchError, NormalizeError, PipelineError, StorageError};
