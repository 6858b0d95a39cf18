//! Shelf Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Logging for the shelf workspace: console/file tracing setup driven by
//! [`logging::LogConfig`].
//!
//! # Example
//!
//! ```no_run
//! use shelf_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     let _guard = init_logging(&config)?;
//!     tracing::info!("Logging ready");
//!     Ok(())
//! }
//! ```

pub mod logging;
