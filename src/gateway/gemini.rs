//! Gemini gateway implementation
//!
//! Connects to the hosted Gemini `generateContent` endpoint and adapts it
//! to the [`ResponseGateway`] contract: a single prompt in, the first
//! candidate's text out. All transport and response-shape failures map to
//! `ParleyError::Gateway`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ResponseGateway;
use crate::config::GatewayConfig;
use crate::error::{ParleyError, Result};

/// Gateway backed by the Gemini generative language API
#[derive(Debug)]
pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

/// Request body for `generateContent`
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiGateway {
    /// Creates a gateway from configuration, reading the API key from the
    /// environment variable named in the config
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Config` when the key variable is unset and
    /// `ParleyError::Gateway` when the HTTP client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ParleyError::Config(format!(
                "Missing API key: set the {} environment variable",
                config.api_key_env
            ))
        })?;
        Self::with_api_key(config, api_key)
    }

    /// Creates a gateway with an explicit API key
    ///
    /// Useful for tests that point `base_url` at a mock server.
    pub fn with_api_key(config: &GatewayConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.max(1)))
            .user_agent("parley/0.1.0")
            .build()
            .map_err(|e| ParleyError::Gateway(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized Gemini gateway: base_url={}, model={}",
            config.base_url,
            config.model
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl ResponseGateway for GeminiGateway {
    async fn generate_response(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| ParleyError::Gateway(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ParleyError::Gateway(format!(
                "API returned {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            ))
            .into());
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ParleyError::Gateway(format!("Malformed response body: {}", e)))?;

        let text: String = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(
                ParleyError::Gateway("Response contained no candidate text".to_string()).into(),
            );
        }

        Ok(text)
    }
}
