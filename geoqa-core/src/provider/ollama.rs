//! Ollama provider implementation.
//!
//! Blocking HTTP client for the Ollama `/api/generate` and `/api/embed`
//! endpoints.

use super::types::*;
use crate::config::LlmConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Ollama HTTP API provider.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    base_url: String,
    http_client: reqwest::blocking::Client,
}

impl OllamaProvider {
    /// Creates a new Ollama provider from the LLM config.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Provider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    fn generate(&self, request: GenerateRequest) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let ollama_request = OllamaGenerateRequest {
            model: request.model,
            prompt: request.prompt,
            stream: false,
            options: {
                let mut opts = HashMap::new();
                opts.insert("temperature".to_string(), serde_json::json!(request.temperature));
                Some(opts)
            },
        };

        debug!(model = %ollama_request.model, prompt_len = ollama_request.prompt.len(), "Sending generate request");

        let response = self.http_client.post(&url).json(&ollama_request).send()?;

        if !response.status().is_success() {
            let error_text = response.text()?;
            return Err(ProviderError::Api(error_text));
        }

        let body = response.json::<OllamaGenerateResponse>()?;
        Ok(body.response.trim().to_string())
    }

    fn embed(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embed", self.base_url);

        let embed_request = EmbedRequest {
            model: model.to_string(),
            input: text.to_string(),
        };

        let response = self.http_client.post(&url).json(&embed_request).send()?;

        if !response.status().is_success() {
            let error_text = response.text()?;
            return Err(ProviderError::Api(error_text));
        }

        let embed_response = response.json::<EmbedResponse>()?;

        embed_response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Other("No embeddings returned".to_string()))
    }
}

// Ollama-specific request/response types (internal)

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OllamaGenerateResponse {
    #[allow(dead_code)]
    #[serde(default)]
    model: String,
    response: String,
    #[allow(dead_code)]
    #[serde(default)]
    done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash() {
        let config = LlmConfig {
            base_url: "http://localhost:11434/".into(),
            ..LlmConfig::default()
        };
        let provider = OllamaProvider::new(&config).unwrap();
        assert_eq!(provider.base_url(), "http://localhost:11434");
        assert_eq!(provider.name(), "Ollama");
    }

    #[test]
    fn test_generate_request_shape() {
        let request = OllamaGenerateRequest {
            model: "llama3".into(),
            prompt: "Question: hi".into(),
            stream: false,
            options: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["stream"], false);
        assert!(json.get("options").is_none());
    }

    #[test]
    fn test_generate_response_parse() {
        let body = r#"{"model":"llama3","created_at":"2024-01-01T00:00:00Z","response":"  Settlement is...  ","done":true}"#;
        let parsed: OllamaGenerateResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.done);
        assert_eq!(parsed.response.trim(), "Settlement is...");
    }

    #[test]
    fn test_unreachable_server_is_an_error() {
        let config = LlmConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: Some(2),
            ..LlmConfig::default()
        };
        let provider = OllamaProvider::new(&config).unwrap();
        let result = provider.generate(GenerateRequest::new("llama3", "hello"));
        assert!(matches!(result, Err(ProviderError::Request(_))));
    }
}
