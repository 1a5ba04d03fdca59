use std::{path::PathBuf, time::Duration};

use crate::error::CrawlError;

pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// How a failed search call is retried. The page token never advances on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            backoff: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub channel_id: String,
    pub api_base_url: String,
    pub output_dir: PathBuf,
    pub retry: RetryPolicy,
}

impl Config {
    pub fn new(api_key: Option<String>, channel_id: Option<String>) -> Result<Self, CrawlError> {
        let api_key = api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| CrawlError::Config("API key is required".into()))?;
        let channel_id = channel_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CrawlError::Config("Channel ID is required".into()))?;

        Ok(Self {
            api_key,
            channel_id,
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            output_dir: PathBuf::from("."),
            retry: RetryPolicy::default(),
        })
    }

    /// Reads the API key from `YOUTUBE_API_KEY`.
    pub fn from_env(channel_id: Option<String>) -> Result<Self, CrawlError> {
        Self::new(std::env::var(API_KEY_VAR).ok(), channel_id)
    }
}
