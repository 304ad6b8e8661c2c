//! Ollama-compatible HTTP client
//!
//! Two calls: `GET /api/tags` as the availability probe (also lists models)
//! and `POST /api/generate` with streaming disabled. No retries.

use nysf_common::config::AnalysisConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

const USER_AGENT: &str = concat!("nysf-server/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Service returned an empty response")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http_client: reqwest::Client,
    base_url: String,
    model: String,
    probe_timeout: Duration,
    generate_timeout: Duration,
}

impl AnalysisClient {
    pub fn new(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            probe_timeout: Duration::from_secs(config.probe_timeout_secs),
            generate_timeout: Duration::from_secs(config.generate_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Model names if the service answers the probe, `None` if unreachable
    pub async fn probe(&self) -> Option<Vec<String>> {
        let response = match self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                debug!("Analysis probe returned {}", response.status());
                return None;
            }
            Err(e) => {
                debug!("Analysis probe failed: {}", e);
                return None;
            }
        };

        // A reachable service with an unreadable model list is still available
        let models = response
            .json::<TagsResponse>()
            .await
            .map(|tags| tags.models.into_iter().map(|m| m.name).collect())
            .unwrap_or_default();
        Some(models)
    }

    pub async fn is_available(&self) -> bool {
        self.probe().await.is_some()
    }

    /// Run one non-streaming generation and return the response text
    pub async fn generate(&self, prompt: &str) -> Result<String, AnalysisError> {
        info!(
            model = %self.model,
            prompt_length = prompt.len(),
            "Sending generation request"
        );

        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.generate_timeout)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
            })
            .send()
            .await
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Generation failed with {}: {}", status, body);
            return Err(AnalysisError::Api(status.as_u16(), body));
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        match generated.response {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => {
                error!("Generation returned an empty response");
                Err(AnalysisError::EmptyResponse)
            }
        }
    }
}
