//! One page of a channel's `search.list` results.

use serde::Deserialize;

use crate::error::CrawlError;

pub const PAGE_SIZE: u32 = 50;

/// A paged search endpoint scoped to one channel.
#[allow(async_fn_in_trait)]
pub trait SearchApi {
    /// Fetches the page behind `page_token`; an empty token asks for the first page.
    async fn search(&self, channel_id: &str, page_token: &str) -> Result<SearchPage, CrawlError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<SearchItem>,
    /// Empty when there are no more pages.
    pub next_page_token: String,
    pub total_results: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchItem {
    pub video_id: String,
    pub published_at: String,
    pub title: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchListResponse {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    page_info: Option<PageInfo>,
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    total_results: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    id: RawId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawId {
    #[serde(default)]
    video_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    #[serde(default)]
    published_at: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    high: Thumbnail,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    url: String,
}

impl From<SearchListResponse> for SearchPage {
    fn from(response: SearchListResponse) -> Self {
        SearchPage {
            items: response
                .items
                .into_iter()
                .map(|item| SearchItem {
                    video_id: item.id.video_id,
                    published_at: item.snippet.published_at,
                    title: item.snippet.title,
                    thumbnail_url: item.snippet.thumbnails.high.url,
                })
                .collect(),
            next_page_token: response.next_page_token.unwrap_or_default(),
            total_results: response.page_info.and_then(|info| info.total_results),
        }
    }
}

/// Pulls `error.message` out of an API error body, falling back to the raw text.
pub(crate) fn api_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned());

    if message.is_empty() {
        format!("status {status}")
    } else {
        format!("status {status}: {message}")
    }
}
