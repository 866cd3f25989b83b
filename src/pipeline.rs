use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::filter;
use crate::models::{ProductRecord, Thresholds};
use crate::parser;
use crate::render::RenderSession;
use crate::search;

/// Parameters for one extraction run.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub thresholds: Thresholds,
    pub max_pages: u32,
    /// Extra wait after a page loads, for content filled in by late scripts.
    pub settle: Duration,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            max_pages: 2,
            settle: Duration::from_millis(1000),
        }
    }
}

/// Fetch, parse and filter up to `max_pages` result pages, in discovery order.
///
/// Takes ownership of the session and closes it on every exit path, including
/// a failed page load, which aborts the run.
pub async fn extract<S: RenderSession>(
    mut session: S,
    keyword: &str,
    opts: &ExtractOptions,
) -> Result<Vec<ProductRecord>> {
    let outcome = run_pages(&mut session, keyword, opts).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close render session: {}", e);
    }

    outcome
}

async fn run_pages<S: RenderSession>(
    session: &mut S,
    keyword: &str,
    opts: &ExtractOptions,
) -> Result<Vec<ProductRecord>> {
    let pb = ProgressBar::new(opts.max_pages as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} page {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mut results = Vec::new();

    for page in 1..=opts.max_pages {
        let url = search::page_url(keyword, page);
        let html = session
            .render(&url)
            .await
            .with_context(|| format!("Failed to load results page {}", page))?;

        if !opts.settle.is_zero() {
            tokio::time::sleep(opts.settle).await;
        }

        let extracted = parser::process_page(&html);
        let kept = filter::apply(extracted.records, &opts.thresholds);
        info!(
            "Page {}: {} candidates ({} untitled), {} kept",
            page,
            extracted.candidates,
            extracted.unnamed,
            kept.len()
        );

        results.extend(kept);
        pb.set_message(format!("{} kept", results.len()));
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::render::RenderError;

    /// Serves canned pages and records what was asked of it.
    struct FakeSession {
        pages: VecDeque<Result<String, RenderError>>,
        requested: Vec<String>,
        closed: Rc<Cell<u32>>,
    }

    impl FakeSession {
        fn new(pages: Vec<Result<String, RenderError>>) -> (Self, Rc<Cell<u32>>) {
            let closed = Rc::new(Cell::new(0));
            let session = Self {
                pages: pages.into(),
                requested: Vec::new(),
                closed: Rc::clone(&closed),
            };
            (session, closed)
        }
    }

    impl RenderSession for FakeSession {
        async fn render(&mut self, url: &str) -> Result<String, RenderError> {
            self.requested.push(url.to_string());
            let page = self.requested.len();
            self.pages
                .pop_front()
                .unwrap_or(Err(RenderError::SnapshotExhausted { page }))
        }

        async fn close(&mut self) -> Result<(), RenderError> {
            self.closed.set(self.closed.get() + 1);
            Ok(())
        }
    }

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    fn quick() -> ExtractOptions {
        ExtractOptions {
            settle: Duration::ZERO,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn second_page_without_items_adds_nothing() {
        let (session, closed) =
            FakeSession::new(vec![Ok(fixture("search_page")), Ok(fixture("empty_page"))]);
        let records = extract(session, "삼겹살", &quick()).await.unwrap();

        let names: Vec<&str> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["한돈 삼겹살 구이용 1kg", "제주 흑돼지 오겹살 500g", "이베리코 삼겹살 800g"]
        );
        assert_eq!(closed.get(), 1);
    }

    #[tokio::test]
    async fn every_output_record_clears_thresholds() {
        let (session, _) =
            FakeSession::new(vec![Ok(fixture("search_page")), Ok(fixture("search_page"))]);
        let opts = ExtractOptions {
            thresholds: Thresholds {
                min_rating: 4.95,
                min_reviews: 500,
            },
            ..quick()
        };
        let records = extract(session, "삼겹살", &opts).await.unwrap();

        assert_eq!(records.len(), 4);
        assert!(records
            .iter()
            .all(|r| r.rating.is_some_and(|v| v >= 4.95) && r.reviews >= 500));
    }

    #[tokio::test]
    async fn requests_each_page_in_order() {
        let pages = (0..3).map(|_| Ok(fixture("empty_page"))).collect();
        let (mut session, _) = FakeSession::new(pages);
        let opts = ExtractOptions {
            max_pages: 3,
            ..quick()
        };

        let records = run_pages(&mut session, "목살", &opts).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(session.requested.len(), 3);
        assert!(session.requested[0].contains("pagingIndex=1&pagingSize=40"));
        assert!(session.requested[2].contains("pagingIndex=3&pagingSize=40"));
    }

    #[tokio::test]
    async fn failed_page_load_is_fatal_and_session_closed() {
        let (session, closed) = FakeSession::new(vec![
            Ok(fixture("search_page")),
            Err(RenderError::Spider {
                url: "page-2".into(),
                message: "net::ERR_CONNECTION_RESET".into(),
            }),
        ]);
        let err = extract(session, "삼겹살", &quick()).await.unwrap_err();

        assert!(err.to_string().contains("results page 2"));
        assert_eq!(closed.get(), 1);
    }

    #[tokio::test]
    async fn garbage_page_contributes_nothing() {
        let (session, closed) = FakeSession::new(vec![Ok(String::new())]);
        let opts = ExtractOptions {
            max_pages: 1,
            ..quick()
        };
        let records = extract(session, "삼겹살", &opts).await.unwrap();
        assert!(records.is_empty());
        assert_eq!(closed.get(), 1);
    }
}
