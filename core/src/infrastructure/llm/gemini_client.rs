use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::domain::{
    analysis::{entities::AnalysisError, ports::LLMClient},
    common::LLMConfig,
};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct GeminiLLMClient {
    api_key: Option<String>,
    model_name: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: String,
}

impl GeminiLLMClient {
    pub fn new(config: &LLMConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AnalysisError::Configuration(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            api_key: config
                .gemini_api_key
                .clone()
                .filter(|key| !key.trim().is_empty()),
            model_name: config.gemini_model.clone(),
            base_url: GEMINI_API_BASE.to_string(),
            client,
        })
    }

    /// Points the client at another endpoint, e.g. a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn call_gemini_api(&self, request: GeminiRequest) -> Result<String, AnalysisError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AnalysisError::Configuration("Gemini API key not set".to_string()))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url, self.model_name
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!(error = %e, "Gemini API request failed");
                AnalysisError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, body = %error_text, "Gemini API error");
            return Err(AnalysisError::Network(format!(
                "Gemini API returned {status}"
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            let e = e.without_url();
            error!(error = %e, "Failed to parse Gemini response");
            AnalysisError::MalformedResponse(format!("unreadable Gemini envelope: {e}"))
        })?;

        let text = gemini_response
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .map(|part| part.text)
            .find(|text| !text.trim().is_empty())
            .ok_or_else(|| AnalysisError::MalformedResponse("No response from LLM".to_string()))?;

        debug!(length = text.len(), "Gemini response received");
        Ok(text)
    }
}

impl LLMClient for GeminiLLMClient {
    async fn connect(&self) -> Result<(), AnalysisError> {
        if !self.is_configured() {
            return Err(AnalysisError::Configuration(
                "Gemini API key not found, using offline mode".to_string(),
            ));
        }

        debug!(model = %self.model_name, "Gemini client ready");
        Ok(())
    }

    async fn generate_with_text(
        &self,
        prompt: String,
        response_schema: serde_json::Value,
    ) -> Result<String, AnalysisError> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema,
            }),
        };

        self.call_gemini_api(request).await
    }
}
