use std::future::Future;
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::{ArtworksEnvelope, PageResult, DEFAULT_BASE_URL, PAGE_SIZE};

/// Why a single page could not be produced.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid page {page}, pages start at 1")]
    InvalidPage { page: usize },

    #[error("request for page {page} failed: {source}")]
    Request {
        page: usize,
        #[source]
        source: reqwest::Error,
    },

    #[error("page {page} returned HTTP {status}")]
    Status { page: usize, status: u16 },

    #[error("page {page} could not be decoded: {source}")]
    Decode {
        page: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn page(&self) -> usize {
        match self {
            Self::InvalidPage { page }
            | Self::Request { page, .. }
            | Self::Status { page, .. }
            | Self::Decode { page, .. } => *page,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("invalid rate {value}, expected a positive number of requests per second")]
    InvalidRate { value: u32 },

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Source of numbered pages. Pages are 1-based.
pub trait PageFetcher {
    fn fetch(&self, page: usize) -> impl Future<Output = Result<PageResult, FetchError>> + Send;
}

#[derive(Clone, Debug)]
pub struct FetcherOptions {
    pub base_url: String,
    pub page_size: usize,
    /// Requests per second; `None` sends as fast as the caller asks.
    pub rate: Option<u32>,
    /// No timeout unless one is configured.
    pub timeout_seconds: Option<u64>,
    pub proxy: Option<String>,
    /// Honour `HTTP_PROXY`-style environment variables when no proxy is set.
    pub system_proxy: bool,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: PAGE_SIZE,
            rate: None,
            timeout_seconds: None,
            proxy: None,
            system_proxy: true,
        }
    }
}

/// Fetches `GET <base>/artworks?page=P&limit=L`.
pub struct HttpPageFetcher {
    client: reqwest::Client,
    endpoint: reqwest::Url,
    page_size: usize,
    limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl std::fmt::Debug for HttpPageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPageFetcher")
            .field("endpoint", &self.endpoint.as_str())
            .field("page_size", &self.page_size)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

impl HttpPageFetcher {
    pub fn new(options: &FetcherOptions) -> Result<Self, ClientError> {
        let endpoint = artworks_endpoint(&options.base_url)?;
        let limiter = match options.rate {
            Some(rate) => {
                let per_second =
                    NonZeroU32::new(rate).ok_or(ClientError::InvalidRate { value: rate })?;
                Some(RateLimiter::direct(Quota::per_second(per_second)))
            }
            None => None,
        };
        let client = build_client(
            options.proxy.as_deref(),
            options.system_proxy,
            options.timeout_seconds,
        )?;
        Ok(Self {
            client,
            endpoint,
            page_size: options.page_size,
            limiter,
        })
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_url(&self, page: usize) -> reqwest::Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("limit", &self.page_size.to_string());
        url
    }
}

impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, page: usize) -> Result<PageResult, FetchError> {
        if page == 0 {
            return Err(FetchError::InvalidPage { page });
        }
        if let Some(limiter) = self.limiter.as_ref() {
            limiter.until_ready().await;
        }

        let url = self.page_url(page);
        debug!(%url, "fetching page");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request { page, source })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                page,
                status: status.as_u16(),
            });
        }
        let body = resp
            .text()
            .await
            .map_err(|source| FetchError::Request { page, source })?;
        let envelope: ArtworksEnvelope =
            serde_json::from_str(&body).map_err(|source| FetchError::Decode { page, source })?;

        let mut result = PageResult::from(envelope);
        if result.records.len() > self.page_size {
            debug!(
                page,
                received = result.records.len(),
                limit = self.page_size,
                "server returned more rows than requested, truncating"
            );
            result.records.truncate(self.page_size);
        }
        debug!(page, rows = result.records.len(), total = result.total, "page fetched");
        Ok(result)
    }
}

/// Fetches a page, degrading any failure into an empty page that keeps
/// `previous_total`. The failure is only logged.
pub async fn fetch_or_empty<F: PageFetcher>(
    fetcher: &F,
    page: usize,
    previous_total: usize,
) -> PageResult {
    match fetcher.fetch(page).await {
        Ok(result) => result,
        Err(error) => {
            warn!(page, %error, "error fetching page");
            PageResult::empty(previous_total)
        }
    }
}

fn artworks_endpoint(base_url: &str) -> Result<reqwest::Url, ClientError> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let invalid = || ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
    };
    let url = reqwest::Url::parse(&format!("{trimmed}/artworks")).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

fn build_client(
    proxy: Option<&str>,
    system_proxy: bool,
    timeout_seconds: Option<u64>,
) -> Result<reqwest::Client, ClientError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(concat!(
            "artpager/",
            env!("CARGO_PKG_VERSION")
        )),
    );
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static("application/json"),
    );

    let mut builder = reqwest::Client::builder().default_headers(headers);
    if let Some(seconds) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    match proxy.filter(|p| !p.trim().is_empty()) {
        Some(proxy) => {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| ClientError::ProxySetup {
                proxy: proxy.to_string(),
                source: e,
            })?;
            builder = builder.proxy(proxy);
        }
        None if !system_proxy => builder = builder.no_proxy(),
        None => {}
    }
    builder
        .build()
        .map_err(|source| ClientError::HttpClientBuild { source })
}
