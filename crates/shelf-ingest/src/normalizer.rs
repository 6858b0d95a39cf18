//! Listing document normalization
//!
//! Maps the loosely typed `best_sellers` entries onto [`ProductRecord`].
//! Text fields pass through untouched (including `null`); the two numeric
//! fields are coerced, with `null` or a missing key becoming zero.

use crate::error::NormalizeError;
use crate::models::ProductRecord;
use serde_json::{Map, Value};

/// Normalize every entry of `best_sellers`, preserving order
///
/// The caller is responsible for checking the document shape first (see
/// [`crate::listing::best_sellers`]); a document without the array yields an
/// empty list.
pub fn normalize(doc: &Value) -> Result<Vec<ProductRecord>, NormalizeError> {
    crate::listing::best_sellers(doc)
        .unwrap_or_default()
        .iter()
        .enumerate()
        .map(|(index, entry)| normalize_entry(index, entry))
        .collect()
}

fn normalize_entry(index: usize, entry: &Value) -> Result<ProductRecord, NormalizeError> {
    let fields = entry
        .as_object()
        .ok_or(NormalizeError::NotAnObject { index })?;

    Ok(ProductRecord {
        product_title: text(fields, "product_title"),
        product_price: text(fields, "product_price"),
        product_star_rating: star_rating(index, fields.get("product_star_rating"))?,
        product_num_ratings: rating_count(index, fields.get("product_num_ratings"))?,
        product_url: text(fields, "product_url"),
        product_picture: text(fields, "product_photo"),
        product_rank_change_label: text(fields, "rank_change_label"),
    })
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn star_rating(index: usize, value: Option<&Value>) -> Result<f64, NormalizeError> {
    let invalid = |v: &Value| NormalizeError::InvalidRating {
        index,
        value: v.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(v @ Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(v)),
        Some(v @ Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| invalid(v)),
        Some(v) => Err(invalid(v)),
    }
}

fn rating_count(index: usize, value: Option<&Value>) -> Result<i64, NormalizeError> {
    let invalid = |v: &Value| NormalizeError::InvalidRatingCount {
        index,
        value: v.to_string(),
    };

    match value {
        None | Some(Value::Null) => Ok(0),
        Some(v @ Value::Number(n)) => n.as_i64().ok_or_else(|| invalid(v)),
        Some(v @ Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid(v)),
        Some(v) => Err(invalid(v)),
    }
}
