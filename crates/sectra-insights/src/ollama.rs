//! Ollama text-generation backend.
//!
//! Non-streaming `/api/generate` client implementing [`TextGenerator`].
//! This is the only vendor-specific code in the repository; everything in
//! the pipeline depends on the trait, not on this backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use sectra_core::{defaults, Error, Result, TextGenerator};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = defaults::OLLAMA_URL;

/// Default generation model.
pub const DEFAULT_GEN_MODEL: &str = defaults::GEN_MODEL;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Ollama generation backend.
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    /// Create a new backend with custom configuration.
    pub fn with_config(base_url: String, model: String) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to create HTTP client");

        info!(base_url = %base_url, model = %model, "Initializing Ollama generator");

        Self {
            client,
            base_url,
            model,
        }
    }

    /// Create from environment variables (`OLLAMA_BASE`,
    /// `OLLAMA_GEN_MODEL`) with defaults.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("OLLAMA_BASE").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let model =
            std::env::var("OLLAMA_GEN_MODEL").unwrap_or_else(|_| DEFAULT_GEN_MODEL.to_string());
        Self::with_config(base_url, model)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str, timeout: Duration) -> Result<String> {
        let start = Instant::now();
        let url = format!("{}/api/generate", self.base_url);
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .timeout(timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::GenerationTimeout(timeout.as_secs())
                } else {
                    Error::Generation(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(Error::Generation(format!(
                "Ollama returned status {}",
                response.status()
            )));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::Generation(e.to_string()))?;

        debug!(
            model = %self.model,
            prompt_len = prompt.len(),
            response_len = body.response.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generation complete"
        );

        Ok(body.response)
    }
}
