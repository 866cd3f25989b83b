use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{ProductRecord, Thresholds};

/// Stand-in for a missing price when ordering; never stored on a record.
const PRICE_ABSENT_SENTINEL: u64 = 999_999_999;

/// Cheapest first, unpriced last. Stable, so ties keep discovery order.
pub fn sort_by_price(records: &mut [ProductRecord]) {
    records.sort_by_key(|r| (r.price.is_none(), r.price.unwrap_or(PRICE_ABSENT_SENTINEL)));
}

pub fn render_text(keyword: &str, records: &[ProductRecord]) -> String {
    let mut out = format!(
        "=== 네이버쇼핑 '{}' 필터링 결과 ({}개) ===\n",
        keyword,
        records.len()
    );

    for (i, r) in records.iter().enumerate() {
        let price = r
            .price
            .map(|p| format!("{}원", p))
            .unwrap_or_else(|| "표시 안 됨".into());
        let rating = r.rating.map(|v| v.to_string()).unwrap_or_else(|| "-".into());

        out.push_str(&format!("{}. {}\n", i + 1, r.name));
        out.push_str(&format!("   - 가격: {}\n", price));
        out.push_str(&format!("   - 평점: {}\n", rating));
        out.push_str(&format!("   - 리뷰: {}\n", r.reviews));
    }

    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    keyword: &'a str,
    fetched_at: DateTime<Utc>,
    filters: JsonFilters,
    count: usize,
    products: &'a [ProductRecord],
}

#[derive(Serialize)]
struct JsonFilters {
    min_rating: f64,
    min_reviews: u64,
    max_pages: u32,
}

pub fn render_json(
    keyword: &str,
    thresholds: &Thresholds,
    max_pages: u32,
    records: &[ProductRecord],
) -> Result<String> {
    let report = JsonReport {
        keyword,
        fetched_at: Utc::now(),
        filters: JsonFilters {
            min_rating: thresholds.min_rating,
            min_reviews: thresholds.min_reviews,
            max_pages,
        },
        count: records.len(),
        products: records,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
