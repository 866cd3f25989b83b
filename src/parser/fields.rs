use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use crate::models::ProductRecord;

static TITLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.product_link__TrAac").unwrap());
static PRICE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.price_num__S2p_v").unwrap());
static GRADE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.product_grade__IzyU3").unwrap());
static REVIEW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.product_review__a1z2V").unwrap());

static DIGITS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());

const THOUSANDS_SEP: char = ',';
const CURRENCY_UNIT: &str = "원";
const RATING_LABEL: &str = "별점";
const REVIEW_LABEL: &str = "리뷰";

/// Trimmed text of the four field elements of one item block, as found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub rating: Option<String>,
    pub reviews: Option<String>,
}

/// Read each field element independently; a missing element leaves only that field empty.
pub fn read_fields(block: ElementRef<'_>) -> RawFields {
    RawFields {
        name: first_text(block, &TITLE),
        price: first_text(block, &PRICE),
        rating: first_text(block, &GRADE),
        reviews: first_text(block, &REVIEW),
    }
}

fn first_text(block: ElementRef<'_>, selector: &Selector) -> Option<String> {
    block
        .select(selector)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
}

/// Rendered text runs collapse to single spaces, as a browser lays them out.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compose a record from raw field text. `None` means the block has no usable name.
pub fn build_record(raw: &RawFields) -> Option<ProductRecord> {
    let name = raw.name.as_deref().and_then(parse_name)?;

    Some(ProductRecord {
        name,
        price: raw.price.as_deref().and_then(parse_price),
        rating: raw.rating.as_deref().and_then(parse_rating),
        reviews: raw.reviews.as_deref().map(parse_reviews).unwrap_or(0),
    })
}

pub fn parse_name(text: &str) -> Option<String> {
    let name = text.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// "12,900원" → 12900. Anything that is not a plain digit run is absent.
pub fn parse_price(text: &str) -> Option<u64> {
    let cleaned = text.replace(THOUSANDS_SEP, "").replace(CURRENCY_UNIT, "");
    parse_digits(cleaned.trim())
}

/// "별점4.95" → 4.95.
pub fn parse_rating(text: &str) -> Option<f64> {
    text.trim()
        .replace(RATING_LABEL, "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite())
}

/// "리뷰 1,234" → 1234; unreadable counts become 0.
pub fn parse_reviews(text: &str) -> u64 {
    let cleaned = text
        .trim()
        .replace(REVIEW_LABEL, "")
        .replace(THOUSANDS_SEP, "");
    parse_digits(cleaned.trim()).unwrap_or(0)
}

fn parse_digits(s: &str) -> Option<u64> {
    if DIGITS_RE.is_match(s) {
        s.parse::<u64>().ok()
    } else {
        None
    }
}
