const SEARCH_ENDPOINT: &str = "https://search.shopping.naver.com/search/all";

/// Items requested per results page.
pub const PAGE_SIZE: u32 = 40;

/// Build the results URL for a 1-based page index.
pub fn page_url(keyword: &str, page: u32) -> String {
    format!(
        "{}?query={}&pagingIndex={}&pagingSize={}",
        SEARCH_ENDPOINT,
        urlencoding::encode(keyword),
        page,
        PAGE_SIZE
    )
}
