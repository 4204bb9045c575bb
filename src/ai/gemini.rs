use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ai::error::InsightError;
use crate::ai::prompt::build_insight_prompt;
use crate::ai::InsightProvider;
use crate::models::Trade;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Environment variable holding the only credential the system needs.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Client for the Gemini generateContent endpoint. One request per insight
/// refresh: no retry, no caching, no timeout beyond the transport default.
pub struct GeminiClient {
    api_key: String,
    model: String,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        GeminiClient {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, InsightError> {
        let api_key =
            std::env::var(API_KEY_ENV).map_err(|_| InsightError::MissingApiKey(API_KEY_ENV))?;
        Ok(Self::new(api_key))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    async fn generate(&self, prompt: String) -> Result<String, InsightError> {
        let url = format!("{}/models/{}:generateContent", BASE_URL, self.model);
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        log::debug!("requesting insight from model {}", self.model);
        let response = self
            .http_client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::warn!("insight request rejected: {} {}", status, message);
            return Err(InsightError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;
        extract_text(body)
    }
}

#[async_trait]
impl InsightProvider for GeminiClient {
    async fn generate_insight(&self, trades: &[Trade]) -> Result<String, InsightError> {
        let prompt = build_insight_prompt(trades)?;
        self.generate(prompt).await
    }
}

fn extract_text(body: GenerateContentResponse) -> Result<String, InsightError> {
    let text = body
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .map(|part| part.text)
        .ok_or(InsightError::EmptyResponse)?;

    if text.trim().is_empty() {
        return Err(InsightError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_extraction() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {
                        "content": {
                            "parts": [{"text": "- You overtrade on Mondays."}],
                            "role": "model"
                        },
                        "finishReason": "STOP"
                    }
                ],
                "modelVersion": "gemini-2.5-flash"
            }"#,
        )
        .unwrap();

        assert_eq!(extract_text(body).unwrap(), "- You overtrade on Mondays.");
    }

    #[test]
    fn test_empty_candidates_is_generation_failure() {
        let body: GenerateContentResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(extract_text(body), Err(InsightError::EmptyResponse)));

        let body: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(matches!(extract_text(body), Err(InsightError::EmptyResponse)));
    }

    #[test]
    fn test_blank_text_is_generation_failure() {
        let body = GenerateContentResponse {
            candidates: vec![Candidate {
                content: Some(Content {
                    parts: vec![Part {
                        text: "   ".to_string(),
                    }],
                }),
            }],
        };
        assert!(matches!(extract_text(body), Err(InsightError::EmptyResponse)));
    }
}
