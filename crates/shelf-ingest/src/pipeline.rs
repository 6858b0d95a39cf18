//! Pipeline orchestration
//!
//! Runs fetch → normalize → stage → persist as a small state machine.
//! The rate-limit probe is the only step whose failure is logged and
//! ignored; every other failure ends the run with a [`PipelineError`],
//! which the caller logs once under [`PipelineError::tag`].
//!
//! ```text
//! Start → Fetching → (FetchFailed | Fetched) → (EmptyResult | Normalized)
//!       → Connecting → (ConnectFailed | Connected) → SchemaReady → Persisted → Done
//! ```

use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::config::{ApiConfig, Config, ListingRequest};
use crate::error::{FetchError, PipelineError, StorageError};
use crate::listing::{self, ListingClient, RateStatus};
use crate::normalizer;
use crate::staging::TabularBatch;
use crate::storage::ProductStore;

/// Pipeline states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Start,
    Fetching,
    FetchFailed,
    Fetched,
    EmptyResult,
    Normalized,
    Connecting,
    ConnectFailed,
    Connected,
    SchemaReady,
    Persisted,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Start => "START",
            RunState::Fetching => "FETCHING",
            RunState::FetchFailed => "FETCH_FAILED",
            RunState::Fetched => "FETCHED",
            RunState::EmptyResult => "EMPTY_RESULT",
            RunState::Normalized => "NORMALIZED",
            RunState::Connecting => "CONNECTING",
            RunState::ConnectFailed => "CONNECT_FAILED",
            RunState::Connected => "CONNECTED",
            RunState::SchemaReady => "SCHEMA_READY",
            RunState::Persisted => "PERSISTED",
            RunState::Done => "DONE",
        };
        f.write_str(name)
    }
}

/// How a successful run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The listing had no products; the database was not contacted
    Empty,
    /// Records were staged but `dry_run` skipped persistence
    DryRun { rows: usize },
    /// Rows were upserted
    Persisted { rows: u64 },
}

/// Per-run switches
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after staging, never connect to the database
    pub dry_run: bool,
    /// Print the staged table to stdout
    pub print_table: bool,
}

/// One pipeline run
#[derive(Debug)]
pub struct Pipeline<'a> {
    config: &'a Config,
    client: ListingClient,
    listing: ListingRequest,
    options: RunOptions,
    state: RunState,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a Config,
        listing: ListingRequest,
        options: RunOptions,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            config,
            client: ListingClient::new(&config.api)?,
            listing,
            options,
            state: RunState::Start,
        })
    }

    /// Current state; after `run` this is the terminal state reached
    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = %self.state, to = %next, "Pipeline state change");
        self.state = next;
    }

    /// Execute the run to completion
    #[instrument(skip(self), fields(category = %self.listing.category, page = self.listing.page))]
    pub async fn run(&mut self) -> Result<RunOutcome, PipelineError> {
        // Diagnostic only, never gates the run.
        if let Some(status) = observe_rate_limits(&self.client, &self.listing).await {
            info!(%status, "API quota");
        }

        self.transition(RunState::Fetching);
        let doc = match self.client.fetch(&self.listing).await {
            Ok(doc) => doc,
            Err(e) => {
                self.transition(RunState::FetchFailed);
                return Err(e.into());
            },
        };

        let Some(entries) = listing::best_sellers(&doc) else {
            self.transition(RunState::EmptyResult);
            return Err(PipelineError::Shape(
                "missing data.best_sellers array".to_string(),
            ));
        };

        if entries.is_empty() {
            warn!("No data available: listing returned no products");
            self.transition(RunState::EmptyResult);
            return Ok(RunOutcome::Empty);
        }
        self.transition(RunState::Fetched);

        let records = normalizer::normalize(&doc)?;
        let batch = TabularBatch::stage(records);
        self.transition(RunState::Normalized);
        info!(rows = batch.len(), "Products staged");

        if self.options.print_table {
            println!("{}", batch.render());
        }

        if self.options.dry_run {
            info!("Dry run: skipping database write");
            return Ok(RunOutcome::DryRun { rows: batch.len() });
        }

        self.transition(RunState::Connecting);
        let mut store = match ProductStore::connect(&self.config.database).await {
            Ok(store) => store,
            Err(e) => {
                self.transition(RunState::ConnectFailed);
                return Err(e.into());
            },
        };
        self.transition(RunState::Connected);

        let persisted = self.persist(&mut store, &batch).await;
        store.close().await;

        let rows = persisted?;
        self.transition(RunState::Done);
        Ok(RunOutcome::Persisted { rows })
    }

    async fn persist(
        &mut self,
        store: &mut ProductStore,
        batch: &TabularBatch,
    ) -> Result<u64, StorageError> {
        store.ensure_schema().await?;
        self.transition(RunState::SchemaReady);

        let rows = store.upsert(batch).await?;
        self.transition(RunState::Persisted);

        Ok(rows)
    }
}

/// Probe the quota headers, logging and swallowing any failure
pub async fn observe_rate_limits(
    client: &ListingClient,
    listing: &ListingRequest,
) -> Option<RateStatus> {
    match client.observe_rate_limits(listing).await {
        Ok(status) => Some(status),
        Err(e) => {
            warn!(error = %e, "[{}] rate limit probe failed", e.tag());
            None
        },
    }
}

/// Run only the rate-limit probe, as the `rate-limits` command does
pub async fn check_rate_limits(
    config: &ApiConfig,
    listing: &ListingRequest,
) -> Result<RateStatus, FetchError> {
    let client = ListingClient::new(config)?;
    client.observe_rate_limits(listing).await
}
