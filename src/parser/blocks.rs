use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

/// A named CSS lookup for product item blocks.
pub struct Lookup {
    pub name: &'static str,
    selector: Selector,
}

impl Lookup {
    pub fn new(name: &'static str, css: &str) -> Self {
        Self {
            name,
            selector: Selector::parse(css).unwrap(),
        }
    }
}

// The results grid ships under two hashed class names depending on layout variant.
static ITEM_LOOKUPS: LazyLock<Vec<Lookup>> = LazyLock::new(|| {
    vec![
        Lookup::new(
            "primary",
            "div.product_item__MDtDF, div.product_item__KZ02m",
        ),
        Lookup::new("fallback", "div.product_item__MDtDF"),
    ]
});

/// Item blocks found on a page and the lookup that found them.
pub struct Candidates<'a> {
    pub blocks: Vec<ElementRef<'a>>,
    pub lookup: Option<&'static str>,
}

/// Locate candidate item blocks using the built-in lookup order.
pub fn locate_candidates(document: &Html) -> Candidates<'_> {
    locate_with(document, &ITEM_LOOKUPS)
}

/// Try each lookup in order; the first one with any match wins.
pub fn locate_with<'a>(document: &'a Html, lookups: &[Lookup]) -> Candidates<'a> {
    for lookup in lookups {
        let blocks: Vec<ElementRef<'a>> = document.select(&lookup.selector).collect();
        if !blocks.is_empty() {
            return Candidates {
                blocks,
                lookup: Some(lookup.name),
            };
        }
    }

    Candidates {
        blocks: Vec::new(),
        lookup: None,
    }
}
