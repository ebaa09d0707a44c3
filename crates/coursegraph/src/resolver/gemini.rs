//! HTTP text-completion backend (Gemini `generateContent`).

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::TextCompletion;
use crate::config::CompletionConfig;
use crate::error::{Error, Result};

const USER_AGENT: &str = concat!("coursegraph/", env!("CARGO_PKG_VERSION"));

/// Blocking client for the Gemini `generateContent` endpoint.
///
/// Every request is bounded by the configured timeout.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: Client,
    url: String,
    api_key: String,
}

impl GeminiClient {
    /// Build a client from configuration.
    ///
    /// Returns `Ok(None)` when no API key is available.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Completion`] if the HTTP client cannot be constructed.
    pub fn from_config(config: &CompletionConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };
        Self::new(config, api_key).map(Some)
    }

    /// Build a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Completion`] if the HTTP client cannot be constructed.
    pub fn new(config: &CompletionConfig, api_key: String) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Completion(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key,
        })
    }
}

impl TextCompletion for GeminiClient {
    fn complete(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .http
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .map_err(|e| Error::Completion(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Completion(format!("HTTP {status}")));
        }

        let body: GenerateResponse = response
            .json()
            .map_err(|e| Error::Completion(format!("unreadable response: {e}")))?;

        let text = body.text();
        debug!(chars = text.len(), "Received completion");
        if text.trim().is_empty() {
            return Err(Error::Completion("empty response".to_string()));
        }
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

impl GenerateResponse {
    /// Text of the first candidate, parts concatenated.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_targets_configured_model() {
        let config = CompletionConfig {
            endpoint: "https://example.test/v1beta/".to_string(),
            ..CompletionConfig::default()
        };

        let client = GeminiClient::new(&config, "key".to_string()).unwrap();

        assert_eq!(
            client.url,
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn missing_api_key_means_no_client() {
        let config = CompletionConfig {
            api_key_env: "COURSEGRAPH_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..CompletionConfig::default()
        };

        assert!(GeminiClient::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn response_text_joins_parts_of_first_candidate() {
        let body: GenerateResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"parts":[{"text":"[\"CS"},{"text":" 2110\"]"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();

        assert_eq!(body.text(), "[\"CS 2110\"]");
    }

    #[test]
    fn response_without_candidates_is_empty_text() {
        let body: GenerateResponse = serde_json::from_str("{}").unwrap();

        assert_eq!(body.text(), "");
    }
}
