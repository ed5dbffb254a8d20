mod client;
pub(crate) mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AiError;
use crate::traits::{CompletionModel, ContentPart};

use client::GeminiClient;
use types::*;

// =============================================================================
// Gemini Agent
// =============================================================================

#[derive(Clone)]
pub struct Gemini {
    api_key: String,
    pub(crate) model: String,
    base_url: Option<String>,
    timeout: Option<Duration>,
    temperature: Option<f32>,
}

impl Gemini {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
            timeout: None,
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub(crate) fn client(&self) -> GeminiClient {
        let client = GeminiClient::new(&self.api_key, self.timeout);
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }
}

#[async_trait]
impl CompletionModel for Gemini {
    fn provider(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, parts: Vec<ContentPart>) -> Result<String, AiError> {
        let inline_parts = parts.iter().filter(|part| !part.is_text()).count();
        let mut request = GenerateContentRequest::user(parts);
        if let Some(temperature) = self.temperature {
            request = request.temperature(temperature);
        }

        let response = self.client().generate(&self.model, &request).await?;

        if let Some(reason) = response.block_reason() {
            return Err(AiError::Blocked(reason.to_string()));
        }

        debug!(
            model = %self.model,
            inline_parts,
            finish_reason = response.finish_reason().unwrap_or("unknown"),
            "Gemini response received"
        );

        response.text().ok_or(AiError::EmptyResponse("Gemini"))
    }
}
