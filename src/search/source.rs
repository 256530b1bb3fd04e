// src/search/source.rs

use async_trait::async_trait;
use std::{env, time::Duration};

use crate::{
    common::error::NetworkError,
    models::product::{SearchResponse, SuggestionItem},
};

const SEARCH_PATH: &str = "/api/products/search";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A busca remota de sugestões. A ordem devolvida é preservada.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn search(&self, text: &str) -> Result<Vec<SuggestionItem>, NetworkError>;
}

#[derive(Debug, Clone)]
pub struct SuggestionConfig {
    pub base_url: String,
    pub debounce: Duration,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            debounce: Duration::from_millis(500),
        }
    }
}

impl SuggestionConfig {
    // SUGGEST_BASE_URL e SUGGEST_DEBOUNCE_MS, com os padrões acima
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let default = Self::default();
        Self {
            base_url: var("SUGGEST_BASE_URL").unwrap_or(default.base_url),
            debounce: var("SUGGEST_DEBOUNCE_MS")
                .and_then(|raw| raw.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(default.debounce),
        }
    }
}

/// Cliente HTTP de `GET /api/products/search?query=...`.
#[derive(Clone)]
pub struct HttpSuggestionSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpSuggestionSource {
    pub fn new(base_url: &str) -> Result<Self, NetworkError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SEARCH_PATH),
        })
    }
}

#[async_trait]
impl SuggestionSource for HttpSuggestionSource {
    async fn search(&self, text: &str) -> Result<Vec<SuggestionItem>, NetworkError> {
        let response = self.client
            .get(&self.endpoint)
            .query(&[("query", text)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status(status.as_u16()));
        }

        let body: SearchResponse = response.json().await?;
        Ok(body.results)
    }
}
