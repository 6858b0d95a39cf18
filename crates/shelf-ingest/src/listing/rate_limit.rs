//! Quota header extraction

use reqwest::header::HeaderMap;
use std::fmt;

pub(crate) const DAILY_LIMIT_HEADER: &str = "x-ratelimit-requests-limit";
pub(crate) const DAILY_REMAINING_HEADER: &str = "x-ratelimit-requests-remaining";
pub(crate) const MINUTE_LIMIT_HEADER: &str = "X-RateLimit-Limit";
pub(crate) const MINUTE_REMAINING_HEADER: &str = "X-RateLimit-Remaining";

/// Quota snapshot reported by the listing API
///
/// Purely diagnostic. A header the API did not send is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateStatus {
    /// HTTP status of the probe response
    pub status: u16,
    pub daily_limit: Option<String>,
    pub daily_remaining: Option<String>,
    pub minute_limit: Option<String>,
    pub minute_remaining: Option<String>,
}

impl RateStatus {
    pub(crate) fn from_headers(status: u16, headers: &HeaderMap) -> Self {
        let read = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
        };

        Self {
            status,
            daily_limit: read(DAILY_LIMIT_HEADER),
            daily_remaining: read(DAILY_REMAINING_HEADER),
            minute_limit: read(MINUTE_LIMIT_HEADER),
            minute_remaining: read(MINUTE_REMAINING_HEADER),
        }
    }
}

impl fmt::Display for RateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "unknown".to_string());
        write!(
            f,
            "daily {}/{} remaining, per-minute {}/{} remaining",
            show(&self.daily_remaining),
            show(&self.daily_limit),
            show(&self.minute_remaining),
            show(&self.minute_limit),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_reads_all_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(DAILY_LIMIT_HEADER, HeaderValue::from_static("500"));
        headers.insert(DAILY_REMAINING_HEADER, HeaderValue::from_static("487"));
        // lookups are case-insensitive; static names must be lowercase
        headers.insert("x-ratelimit-limit", HeaderValue::from_static("10"));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("9"));

        let status = RateStatus::from_headers(200, &headers);
        assert_eq!(status.daily_limit.as_deref(), Some("500"));
        assert_eq!(status.daily_remaining.as_deref(), Some("487"));
        assert_eq!(status.minute_limit.as_deref(), Some("10"));
        assert_eq!(status.minute_remaining.as_deref(), Some("9"));
    }

    #[test]
    fn test_missing_headers_are_unknown() {
        let mut headers = HeaderMap::new();
        headers.insert(DAILY_LIMIT_HEADER, HeaderValue::from_static("500"));

        let status = RateStatus::from_headers(200, &headers);
        assert_eq!(status.daily_remaining, None);
        assert_eq!(
            status.to_string(),
            "daily unknown/500 remaining, per-minute unknown/unknown remaining"
        );
    }
}
