//! Generation capability contract
//!
//! The model itself is an external collaborator: a single `generate` call
//! over the query/history/system triple. The production implementation is a
//! thin client for the local inference runtime sidecar; tests inject mocks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sampling parameters forwarded to the generation capability
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub seed: Option<i64>,
    pub max_tokens: Option<u32>,
}

/// Errors from the generation capability
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("inference runtime error: {0}")]
    Runtime(String),
}

/// The injected generation capability
///
/// `history` is ordered (prompt, response) pairs from prior turns.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        query: &str,
        history: &[(String, String)],
        system: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerateError>;
}

#[derive(Debug, Serialize)]
struct RuntimeRequest<'a> {
    query: &'a str,
    history: &'a [(String, String)],
    system: &'a str,
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RuntimeResponse {
    text: String,
}

/// Client for the inference runtime sidecar
pub struct RuntimeGenerator {
    http: reqwest::Client,
    base_url: String,
}

impl RuntimeGenerator {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for RuntimeGenerator {
    async fn generate(
        &self,
        query: &str,
        history: &[(String, String)],
        system: &str,
        params: &SamplingParams,
    ) -> Result<String, GenerateError> {
        let url = format!("{}/generate", self.base_url);
        let body = RuntimeRequest {
            query,
            history,
            system,
            temperature: params.temperature,
            top_p: params.top_p,
            seed: params.seed,
            max_tokens: params.max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Runtime(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerateError::Runtime(format!(
                "runtime returned status {}",
                response.status()
            )));
        }

        let payload: RuntimeResponse = response
            .json()
            .await
            .map_err(|e| GenerateError::Runtime(e.to_string()))?;

        Ok(payload.text)
    }
}
