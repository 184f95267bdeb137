// HTTP client for the suggestion/statistics backend
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One remote suggestion. The backend may send bare strings or objects;
/// the rank is informational only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "WireSuggestion")]
pub struct SuggestionItem {
    pub word: String,
    pub rank: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireSuggestion {
    Word(String),
    Ranked {
        word: String,
        #[serde(alias = "freq")]
        rank: Option<i64>,
    },
}

impl From<WireSuggestion> for SuggestionItem {
    fn from(w: WireSuggestion) -> Self {
        match w {
            WireSuggestion::Word(word) => Self { word, rank: None },
            WireSuggestion::Ranked { word, rank } => Self { word, rank },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatItem {
    pub word: String,
    pub freq: i64,
}

/// Decodes a `/stats` body. Elements that are not `{word, freq}` are
/// skipped; only a body that is not a JSON array is an error.
pub fn decode_stats(body: &[u8]) -> Result<Vec<StatItem>, ApiError> {
    let raw: Vec<serde_json::Value> = serde_json::from_slice(body)?;
    Ok(raw
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect())
}

#[derive(Serialize)]
struct Selection<'a> {
    word: &'a str,
}

#[async_trait]
pub trait WordApi: Send + Sync {
    async fn suggest(&self, prefix: &str) -> Result<Vec<SuggestionItem>, ApiError>;
    async fn select(&self, word: &str) -> Result<(), ApiError>;
    async fn stats(&self) -> Result<Vec<StatItem>, ApiError>;
}

pub struct HttpApi {
    base_url: String,
    client: Client,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WordApi for HttpApi {
    async fn suggest(&self, prefix: &str) -> Result<Vec<SuggestionItem>, ApiError> {
        let res = self
            .client
            .get(format!("{}/suggest", self.base_url))
            .query(&[("prefix", prefix)])
            .send()
            .await?
            .error_for_status()?;
        let body = res.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn select(&self, word: &str) -> Result<(), ApiError> {
        self.client
            .post(format!("{}/select", self.base_url))
            .json(&Selection { word })
            .send()
            .await?;
        Ok(())
    }

    async fn stats(&self) -> Result<Vec<StatItem>, ApiError> {
        let res = self
            .client
            .get(format!("{}/stats", self.base_url))
            .send()
            .await?
            .error_for_status()?;
        let body = res.bytes().await?;
        decode_stats(&body)
    }
}
