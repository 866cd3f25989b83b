pub mod blocks;
pub mod fields;

use scraper::Html;
use tracing::debug;

use crate::models::ProductRecord;

/// Records parsed from one rendered page, before filtering.
pub struct PageExtraction {
    pub records: Vec<ProductRecord>,
    pub candidates: usize,
    pub unnamed: usize,
}

/// Two-pass pipeline: rendered HTML → item blocks → product records.
pub fn process_page(html: &str) -> PageExtraction {
    let document = Html::parse_document(html);
    let found = blocks::locate_candidates(&document);

    match found.lookup {
        Some(lookup) => debug!("{} item blocks via {} lookup", found.blocks.len(), lookup),
        None => debug!("no item blocks matched any lookup"),
    }

    let mut records = Vec::with_capacity(found.blocks.len());
    let mut unnamed = 0;

    for block in &found.blocks {
        let raw = fields::read_fields(*block);
        match fields::build_record(&raw) {
            Some(record) => records.push(record),
            None => {
                debug!("skipping item block without a title");
                unnamed += 1;
            }
        }
    }

    PageExtraction {
        records,
        candidates: found.blocks.len(),
        unnamed,
    }
}

// ── Tests ──
