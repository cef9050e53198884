use reqwest::Client;
use std::future::Future;

use crate::config::EngineConfig;
use crate::lyrics::types::{Candidate, FetchError};

/// Anything that can answer a free-text lyrics search.
pub trait LyricsSearch {
    fn search(&self, query: &str) -> impl Future<Output = Result<Vec<Candidate>, FetchError>> + Send;
}

/// Client for the lrclib.net search endpoint.
#[derive(Debug, Clone)]
pub struct LrclibClient {
    client: Client,
    base_url: String,
}

impl LrclibClient {
    pub fn new(config: &EngineConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Transport)?;
        Ok(Self {
            client,
            base_url: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/api/search?q={}",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

impl LyricsSearch for LrclibClient {
    async fn search(&self, query: &str) -> Result<Vec<Candidate>, FetchError> {
        let url = self.search_url(query);
        tracing::debug!(%url, "Searching lrclib");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Server(resp.status()));
        }
        let candidates: Vec<Candidate> = resp.json().await?;
        Ok(candidates)
    }
}

/// Pick the first candidate whose duration is within `tolerance` seconds of
/// `target`, in server order.
///
/// This is first-match, not closest-match: with `[100, 205, 300]`, target
/// 203 and tolerance 2 it returns 205 even if a later 203 existed.
pub fn select_candidate(candidates: &[Candidate], target: f64, tolerance: f64) -> Option<&Candidate> {
    candidates
        .iter()
        .find(|c| (c.duration - target).abs() <= tolerance)
}
