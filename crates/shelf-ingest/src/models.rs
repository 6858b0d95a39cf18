// Product listing data models

/// One observed product from the best-sellers listing
///
/// `product_url` is the identity key. Every other field holds the most
/// recently observed value.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub product_title: Option<String>,

    /// Currency-formatted price exactly as the API sent it (e.g. "$59.99")
    pub product_price: Option<String>,

    /// Star rating, 0.0 when the API sent none
    pub product_star_rating: f64,

    /// Number of ratings, 0 when the API sent none
    pub product_num_ratings: i64,

    pub product_url: Option<String>,

    pub product_picture: Option<String>,

    /// Rank movement label (e.g. "+1")
    pub product_rank_change_label: Option<String>,
}

impl ProductRecord {
    /// Star rating in the text form stored in the table
    ///
    /// Whole numbers keep a trailing `.0` so `4` is stored as `4.0`.
    pub fn star_rating_text(&self) -> String {
        format_rating(self.product_star_rating)
    }
}

pub(crate) fn format_rating(value: f64) -> String {
    let text = value.to_string();
    if value.is_finite() && !text.contains(['.', 'e', 'E']) {
        format!("{}.0", text)
    } else {
        text
    }
}
