use std::path::PathBuf;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT_LANGUAGE, USER_AGENT};
use spider_client::shapes::request::{
    IdleNetwork, RequestType, ReturnFormat, ReturnFormatHandling, Timeout, WaitFor,
};
use spider_client::{RequestParams, Spider};
use thiserror::Error;
use tracing::debug;

const DESKTOP_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const IDLE_NETWORK_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("SPIDER_API_KEY environment variable must be set")]
    MissingApiKey,
    #[error("failed to create spider client: {0}")]
    SpiderClient(String),
    #[error("failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
    #[error("spider render failed for {url}: {message}")]
    Spider { url: String, message: String },
    #[error("upstream answered {status} for {url}")]
    Status { url: String, status: u16 },
    #[error("no document returned for {url}")]
    EmptyBody { url: String },
    #[error("request failed for {url}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("no snapshot left for page {page}")]
    SnapshotExhausted { page: usize },
    #[error("cannot read snapshot {path}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Something that turns a results URL into rendered HTML.
///
/// One session serves every page of a run and is closed exactly once at the end.
#[allow(async_fn_in_trait)]
pub trait RenderSession {
    async fn render(&mut self, url: &str) -> Result<String, RenderError>;

    async fn close(&mut self) -> Result<(), RenderError> {
        Ok(())
    }
}

/// Headless Chrome rendering through spider.cloud.
pub struct SpiderSession {
    spider: Spider,
}

impl SpiderSession {
    pub fn open() -> Result<Self, RenderError> {
        let api_key = std::env::var("SPIDER_API_KEY").map_err(|_| RenderError::MissingApiKey)?;
        let spider =
            Spider::new(Some(api_key)).map_err(|e| RenderError::SpiderClient(e.to_string()))?;
        Ok(Self { spider })
    }
}

impl RenderSession for SpiderSession {
    async fn render(&mut self, url: &str) -> Result<String, RenderError> {
        let params = RequestParams {
            request: Some(RequestType::Browser),
            return_format: Some(ReturnFormatHandling::Single(ReturnFormat::Raw)),
            wait_for: Some(WaitFor {
                idle_network: Some(IdleNetwork {
                    timeout: Timeout {
                        secs: IDLE_NETWORK_SECS,
                        nanos: 0,
                    },
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let start = Instant::now();
        let response = self
            .spider
            .scrape_url(url, Some(params), "application/json")
            .await
            .map_err(|e| RenderError::Spider {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        debug!("spider rendered {} in {}ms", url, start.elapsed().as_millis());

        document_from_response(url, response)
    }
}

/// Pull the rendered HTML out of a spider.cloud response.
///
/// The API answers with an array whose first element carries `status` and
/// `content`, sometimes wrapped in a JSON string.
fn document_from_response(url: &str, response: serde_json::Value) -> Result<String, RenderError> {
    let parsed: serde_json::Value = match response.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or(response.clone()),
        None => response,
    };
    let first = parsed.as_array().and_then(|arr| arr.first());

    let status = first
        .and_then(|obj| obj.get("status"))
        .and_then(|s| s.as_u64())
        .and_then(|s| u16::try_from(s).ok());
    if let Some(status) = status.filter(|s| !(200..300).contains(s)) {
        return Err(RenderError::Status {
            url: url.to_string(),
            status,
        });
    }

    first
        .and_then(|obj| obj.get("content"))
        .and_then(|c| c.as_str())
        .filter(|c| !c.trim().is_empty())
        .map(String::from)
        .ok_or_else(|| RenderError::EmptyBody {
            url: url.to_string(),
        })
}

/// Plain HTTP fetch for markup that is already server-rendered.
pub struct HttpSession {
    client: reqwest::Client,
}

impl HttpSession {
    pub fn open() -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(RenderError::HttpClient)?;
        Ok(Self { client })
    }
}

impl RenderSession for HttpSession {
    async fn render(&mut self, url: &str) -> Result<String, RenderError> {
        let http_err = |source| RenderError::Http {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, DESKTOP_UA)
            .header(ACCEPT_LANGUAGE, "ko-KR,ko;q=0.9")
            .send()
            .await
            .map_err(http_err)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(http_err)
    }
}

/// Pre-rendered pages read from disk, one file per page in order.
pub struct SnapshotSession {
    files: Vec<PathBuf>,
    served: usize,
}

impl SnapshotSession {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files, served: 0 }
    }
}

impl RenderSession for SnapshotSession {
    async fn render(&mut self, url: &str) -> Result<String, RenderError> {
        let page = self.served + 1;
        let path = self
            .files
            .get(self.served)
            .cloned()
            .ok_or(RenderError::SnapshotExhausted { page })?;
        self.served += 1;

        debug!("serving {} for {}", path.display(), url);
        let read = tokio::fs::read_to_string(&path).await;
        read.map_err(|source| RenderError::Snapshot { path, source })
    }
}
