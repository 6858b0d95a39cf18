//! Columnar staging of normalized records
//!
//! [`TabularBatch`] is the hand-off between normalization and persistence:
//! the console table and the bulk upsert both read from it.

use crate::models::{format_rating, ProductRecord};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, CellAlignment, Table};

/// Column names, in table order
pub const COLUMNS: [&str; 7] = [
    "product_title",
    "product_price",
    "product_star_rating",
    "product_num_ratings",
    "product_url",
    "product_picture",
    "product_rank_change_label",
];

const NULL_DISPLAY: &str = "NULL";

/// One column per field, all the same length
///
/// Only [`TabularBatch::stage`] fills the columns, which keeps them aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularBatch {
    product_title: Vec<Option<String>>,
    product_price: Vec<Option<String>>,
    product_star_rating: Vec<f64>,
    product_num_ratings: Vec<i64>,
    product_url: Vec<Option<String>>,
    product_picture: Vec<Option<String>>,
    product_rank_change_label: Vec<Option<String>>,
}

/// Borrowed view of one staged row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StagedRow<'a> {
    pub product_title: Option<&'a str>,
    pub product_price: Option<&'a str>,
    pub product_star_rating: f64,
    pub product_num_ratings: i64,
    pub product_url: Option<&'a str>,
    pub product_picture: Option<&'a str>,
    pub product_rank_change_label: Option<&'a str>,
}

impl StagedRow<'_> {
    pub fn star_rating_text(&self) -> String {
        format_rating(self.product_star_rating)
    }
}

impl TabularBatch {
    /// Stage records column-wise, keeping their order
    pub fn stage(records: Vec<ProductRecord>) -> Self {
        let mut batch = Self::with_capacity(records.len());
        for record in records {
            batch.product_title.push(record.product_title);
            batch.product_price.push(record.product_price);
            batch.product_star_rating.push(record.product_star_rating);
            batch.product_num_ratings.push(record.product_num_ratings);
            batch.product_url.push(record.product_url);
            batch.product_picture.push(record.product_picture);
            batch.product_rank_change_label.push(record.product_rank_change_label);
        }
        batch
    }

    fn with_capacity(n: usize) -> Self {
        Self {
            product_title: Vec::with_capacity(n),
            product_price: Vec::with_capacity(n),
            product_star_rating: Vec::with_capacity(n),
            product_num_ratings: Vec::with_capacity(n),
            product_url: Vec::with_capacity(n),
            product_picture: Vec::with_capacity(n),
            product_rank_change_label: Vec::with_capacity(n),
        }
    }

    pub fn len(&self) -> usize {
        self.rows().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate rows in staging order
    pub fn rows(&self) -> impl ExactSizeIterator<Item = StagedRow<'_>> + '_ {
        self.product_title
            .iter()
            .zip(&self.product_price)
            .zip(&self.product_star_rating)
            .zip(&self.product_num_ratings)
            .zip(&self.product_url)
            .zip(&self.product_picture)
            .zip(&self.product_rank_change_label)
            .map(|((((((title, price), rating), count), url), picture), label)| StagedRow {
                product_title: title.as_deref(),
                product_price: price.as_deref(),
                product_star_rating: *rating,
                product_num_ratings: *count,
                product_url: url.as_deref(),
                product_picture: picture.as_deref(),
                product_rank_change_label: label.as_deref(),
            })
    }

    /// Render the batch as an aligned console table
    pub fn render(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(COLUMNS);

        let show = |v: Option<&str>| v.unwrap_or(NULL_DISPLAY).to_string();

        for row in self.rows() {
            table.add_row(vec![
                Cell::new(show(row.product_title)),
                Cell::new(show(row.product_price)),
                Cell::new(row.star_rating_text()).set_alignment(CellAlignment::Right),
                Cell::new(row.product_num_ratings).set_alignment(CellAlignment::Right),
                Cell::new(show(row.product_url)),
                Cell::new(show(row.product_picture)),
                Cell::new(show(row.product_rank_change_label)),
            ]);
        }

        table
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(url: &str, rating: f64) -> ProductRecord {
        ProductRecord {
            product_title: Some(format!("Title {}", url)),
            product_price: Some("$10.00".to_string()),
            product_star_rating: rating,
            product_num_ratings: 3,
            product_url: Some(url.to_string()),
            product_picture: None,
            product_rank_change_label: Some("-2".to_string()),
        }
    }

    #[test]
    fn test_stage_preserves_order_and_count() {
        let batch = TabularBatch::stage(vec![
            record("http://x/B", 4.0),
            record("http://x/A", 3.5),
            record("http://x/B", 4.0),
        ]);

        assert_eq!(batch.len(), 3);
        let urls: Vec<_> = batch.rows().map(|r| r.product_url.unwrap()).collect();
        assert_eq!(urls, vec!["http://x/B", "http://x/A", "http://x/B"]);
    }

    #[test]
    fn test_empty_stage() {
        let batch = TabularBatch::stage(Vec::new());
        assert!(batch.is_empty());
        assert_eq!(batch.rows().len(), 0);
    }

    #[test]
    fn test_short_column_truncates_instead_of_panicking() {
        let batch = TabularBatch {
            product_url: vec![Some("http://x/A".to_string())],
            ..Default::default()
        };

        assert_eq!(batch.rows().count(), 0);
        assert!(batch.is_empty());
        assert_eq!(batch.render().row_iter().count(), 0);
    }

    #[test]
    fn test_render_shows_nulls_and_ratings() {
        let batch = TabularBatch::stage(vec![record("http://x/A", 4.0)]);
        let rendered = batch.render().to_string();

        assert!(rendered.contains("product_rank_change_label"));
        assert!(rendered.contains("http://x/A"));
        assert!(rendered.contains("4.0"));
        assert!(rendered.contains(NULL_DISPLAY));
    }
}
