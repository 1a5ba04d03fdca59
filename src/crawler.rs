//! The pagination loop tying search, transform and download together.

use std::path::PathBuf;

use indicatif::ProgressBar;
use tracing::{error, info};

use crate::{
    config::{Config, RetryPolicy},
    download::{download, Fetcher},
    error::CrawlError,
    search::{SearchApi, SearchItem, SearchPage},
    transform::DownloadTarget,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages: usize,
    pub downloaded: usize,
    /// Items dropped because their publish timestamp didn't parse.
    pub skipped: usize,
    /// Items whose file could not be created or whose transfer failed.
    pub failed: usize,
}

pub struct Crawler<A> {
    api: A,
    channel_id: String,
    output_dir: PathBuf,
    retry: RetryPolicy,
    progress: ProgressBar,
}

impl<A: SearchApi + Fetcher> Crawler<A> {
    pub fn new(api: A, config: &Config) -> Self {
        Self {
            api,
            channel_id: config.channel_id.clone(),
            output_dir: config.output_dir.clone(),
            retry: config.retry,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// The search and fetch backend, e.g. to inspect a fake once a crawl is done.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Walks every page of the channel until the continuation token comes back empty.
    ///
    /// Item failures are logged and counted. The only error returned is a
    /// search failure that outlived a bounded [`RetryPolicy`].
    pub async fn crawl(&self) -> Result<CrawlSummary, CrawlError> {
        let mut summary = CrawlSummary::default();
        let mut page_token = String::new();

        loop {
            let page = self.next_page(&page_token).await?;
            summary.pages += 1;

            if let Some(total) = page.total_results {
                self.progress.set_length(total);
            }
            info!(
                page = summary.pages,
                items = page.items.len(),
                "processing search page"
            );

            for item in &page.items {
                self.process_item(item, &mut summary).await;
                self.progress.inc(1);
            }

            page_token = page.next_page_token;
            if page_token.is_empty() {
                break;
            }
        }

        self.progress.finish_and_clear();
        info!(
            pages = summary.pages,
            downloaded = summary.downloaded,
            skipped = summary.skipped,
            failed = summary.failed,
            "crawl complete"
        );

        Ok(summary)
    }

    async fn next_page(&self, page_token: &str) -> Result<SearchPage, CrawlError> {
        let mut attempts = 0u32;

        loop {
            match self.api.search(&self.channel_id, page_token).await {
                Ok(page) => return Ok(page),
                Err(err) => {
                    attempts += 1;
                    error!(page_token, attempts, "Error: {err}");

                    if self.retry.max_attempts.is_some_and(|max| attempts >= max) {
                        return Err(err);
                    }
                    if !self.retry.backoff.is_zero() {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
            }
        }
    }

    async fn process_item(&self, item: &SearchItem, summary: &mut CrawlSummary) {
        let target = match DownloadTarget::from_item(item) {
            Ok(target) => target,
            Err(err) => {
                error!(video_id = %item.video_id, "Error: {err}");
                summary.skipped += 1;
                return;
            }
        };

        self.progress.set_message(target.name.clone());

        match download(&self.api, &self.output_dir, &target.url, &target.name).await {
            Ok(name) => {
                info!(video_id = %item.video_id, %name, "downloaded thumbnail");
                summary.downloaded += 1;
            }
            Err(err) => {
                error!(video_id = %item.video_id, url = %target.url, "Error: {err}");
                summary.failed += 1;
            }
        }
    }
}
