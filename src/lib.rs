use futures_util::stream::StreamExt;
use reqwest::Client;
use tracing::{debug, warn};

pub mod config;
pub mod crawler;
pub mod download;
pub mod error;
pub mod search;
pub mod transform;

pub use config::{Config, RetryPolicy};
pub use crawler::{CrawlSummary, Crawler};
pub use download::{ByteStream, Fetcher};
pub use error::CrawlError;
pub use search::{SearchApi, SearchItem, SearchPage};
pub use transform::DownloadTarget;

use search::{api_error_message, SearchListResponse, PAGE_SIZE};

/// YouTube Data API client, also used for the unauthenticated thumbnail GETs.
pub struct YouTubeClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(config: &Config) -> Result<Self, CrawlError> {
        // No timeout: a stalled request blocks the crawl.
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CrawlError::Client)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_owned(),
        })
    }
}

impl SearchApi for YouTubeClient {
    async fn search(&self, channel_id: &str, page_token: &str) -> Result<SearchPage, CrawlError> {
        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "id,snippet"),
                ("channelId", channel_id),
                ("maxResults", page_size.as_str()),
                ("order", "date"),
                ("pageToken", page_token),
                ("safeSearch", "none"),
                ("type", "video"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CrawlError::RemoteQuery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CrawlError::RemoteQuery(api_error_message(status, &body)));
        }

        let page: SearchListResponse = response
            .json()
            .await
            .map_err(|e| CrawlError::RemoteQuery(e.to_string()))?;

        debug!(channel_id, page_token, "fetched search page");
        Ok(page.into())
    }
}

impl Fetcher for YouTubeClient {
    async fn fetch(&self, url: &str) -> Result<ByteStream, CrawlError> {
        let res = self.client.get(url).send().await?;

        // The body is saved whatever the status; only note it.
        if !res.status().is_success() {
            warn!(url, status = %res.status(), "thumbnail request returned a non-success status");
        }

        Ok(Box::pin(
            res.bytes_stream().map(|chunk| chunk.map_err(CrawlError::from)),
        ))
    }
}
