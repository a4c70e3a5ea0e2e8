use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{SearchResponse, Story};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("search API responded with status {0}")]
    Status(u16),
    #[error("malformed search response: {0}")]
    Decode(String),
}

/// Anything that can turn a request URL into a list of stories.
pub trait SearchProvider: Send + Sync {
    fn search(&self, url: &str) -> Result<Vec<Story>, FetchError>;
}

impl<F> SearchProvider for F
where
    F: Fn(&str) -> Result<Vec<Story>, FetchError> + Send + Sync,
{
    fn search(&self, url: &str) -> Result<Vec<Story>, FetchError> {
        self(url)
    }
}

/// Appends the URL-escaped term to the endpoint.
pub fn search_url(endpoint: &str, term: &str) -> String {
    format!("{}{}", endpoint, urlencoding::encode(term))
}

pub struct AlgoliaClient {
    client: Client,
}

impl AlgoliaClient {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    fn parse_stories(body: &str) -> Result<Vec<Story>, FetchError> {
        let response: SearchResponse =
            serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(response.into())
    }
}

impl SearchProvider for AlgoliaClient {
    fn search(&self, url: &str) -> Result<Vec<Story>, FetchError> {
        debug!(url, "requesting stories");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let stories = Self::parse_stories(&body)?;

        info!("Loaded {} stories", stories.len());
        Ok(stories)
    }
}
