//! Listing API access
//!
//! [`ListingClient`] wraps the best-sellers endpoint: one call to fetch the
//! listing document and one probe that reports the account's quota headers.

mod client;
mod rate_limit;

pub use client::ListingClient;
pub use rate_limit::RateStatus;

use serde_json::Value;

/// Borrow the `data.best_sellers` array of a listing document
///
/// Returns `None` when the document does not have that shape. An empty array
/// is returned as `Some(&[])` so callers can tell "no products" apart from
/// "unexpected payload".
pub fn best_sellers(doc: &Value) -> Option<&[Value]> {
    doc.get("data")?
        .as_object()?
        .get("best_sellers")?
        .as_array()
        .map(Vec::as_slice)
}
