use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::{AppConfig, require};
use crate::error::{CollaboratorError, CollaboratorResult, ConfigError};
use crate::prompt::ReplyFormat;
use crate::providers::{TextGenerator, assert_ok_response};

const GEMINI_API_ROOT: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

pub struct GeminiGenerator {
    client: Client,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(client: Client, config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            api_key: require(&config.gemini_api_key, "GEMINI_API_KEY")?,
            model: config.gemini_model.clone(),
        })
    }
}

/// Joins the text parts of the first candidate.
fn candidate_text(payload: GenerateContentResponse) -> CollaboratorResult<String> {
    let text = payload
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(CollaboratorError::Payload("Gemini returned no candidate text".to_string()));
    }
    Ok(text)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn reply_format(&self) -> ReplyFormat {
        ReplyFormat::LabeledBlocks
    }

    async fn complete(&self, prompt: &str) -> CollaboratorResult<String> {
        let response = self
            .client
            .post(format!("{GEMINI_API_ROOT}/{}:generateContent", self.model))
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{"parts": [{"text": prompt}]}],
            }))
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let payload: GenerateContentResponse = response.json().await?;
        candidate_text(payload)
    }
}
