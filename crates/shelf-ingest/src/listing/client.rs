//! HTTP client for the listing API

use super::rate_limit::RateStatus;
use crate::config::{ApiConfig, ListingRequest};
use crate::error::FetchError;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// Longest slice of an error body carried into [`FetchError::Http`]
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for the best-sellers listing endpoint
#[derive(Clone)]
pub struct ListingClient {
    client: Client,
    listing_url: String,
    api_key: String,
    api_host: String,
}

impl fmt::Debug for ListingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListingClient")
            .field("listing_url", &self.listing_url)
            .field("api_key", &"<redacted>")
            .field("api_host", &self.api_host)
            .finish_non_exhaustive()
    }
}

impl ListingClient {
    /// Build a client with the configured request deadline
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| FetchError::Unknown {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            listing_url: config.listing_url.clone(),
            api_key: config.api_key.clone(),
            api_host: config.api_host.clone(),
        })
    }

    pub fn listing_url(&self) -> &str {
        &self.listing_url
    }

    fn request(&self, listing: &ListingRequest) -> RequestBuilder {
        self.client
            .get(&self.listing_url)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.api_host)
            .query(&listing.query_pairs())
    }

    /// Fetch one listing page and return the parsed document unmodified
    pub async fn fetch(&self, listing: &ListingRequest) -> Result<Value, FetchError> {
        info!(
            url = %self.listing_url,
            category = %listing.category,
            page = listing.page,
            "Fetching product listing"
        );

        let response = self.request(listing).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(FetchError::Http {
                status: status.as_u16(),
                message: if snippet.is_empty() {
                    status.canonical_reason().unwrap_or("unknown status").to_string()
                } else {
                    snippet
                },
            });
        }

        let doc: Value = response.json().await?;
        debug!(response = %doc, "Listing response");

        Ok(doc)
    }

    /// Probe the endpoint and report the quota headers
    ///
    /// Any HTTP status is accepted since error responses carry the same
    /// headers; only a transport failure is an error.
    pub async fn observe_rate_limits(
        &self,
        listing: &ListingRequest,
    ) -> Result<RateStatus, FetchError> {
        let response = self.request(listing).send().await?;
        let status = RateStatus::from_headers(response.status().as_u16(), response.headers());
        debug!(http_status = status.status, "Rate limit probe finished");
        Ok(status)
    }
}
