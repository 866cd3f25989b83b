use serde::Serialize;

/// One product listing parsed from a search results page.
///
/// `rating` stays optional so the filter, not the parser, decides what a
/// missing rating means.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: Option<u64>,
    pub rating: Option<f64>,
    pub reviews: u64,
}

/// Inclusive lower bounds a record must clear to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thresholds {
    pub min_rating: f64,
    pub min_reviews: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_rating: 4.9,
            min_reviews: 100,
        }
    }
}
