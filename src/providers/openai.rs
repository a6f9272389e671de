use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::{AppConfig, require};
use crate::error::{CollaboratorError, CollaboratorResult, ConfigError};
use crate::prompt::ReplyFormat;
use crate::providers::{TextGenerator, assert_ok_response};

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
}

pub struct OpenAiGenerator {
    client: Client,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(client: Client, config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            api_key: require(&config.openai_api_key, "OPENAI_API_KEY")?,
            model: config.openai_model.clone(),
        })
    }
}

fn first_message(payload: ChatCompletionResponse) -> CollaboratorResult<String> {
    if let Some(error) = payload.error.and_then(|err| err.message) {
        return Err(CollaboratorError::Payload(format!("OpenAI returned an error: {error}")));
    }
    payload
        .choices
        .and_then(|choices| choices.into_iter().next())
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .ok_or_else(|| CollaboratorError::Payload("OpenAI returned no message content".to_string()))
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    fn reply_format(&self) -> ReplyFormat {
        ReplyFormat::Json
    }

    async fn complete(&self, prompt: &str) -> CollaboratorResult<String> {
        let response = self
            .client
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.model,
                "messages": [{"role": "user", "content": prompt}],
                "temperature": TEMPERATURE,
            }))
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let payload: ChatCompletionResponse = response.json().await?;
        first_message(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_choice_content() {
        let payload: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "{\"en\": {}}"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_message(payload).unwrap(), "{\"en\": {}}");
    }

    #[test]
    fn error_body_becomes_payload_error() {
        let payload: ChatCompletionResponse =
            serde_json::from_str(r#"{"error": {"message": "quota exceeded"}}"#).unwrap();
        let err = first_message(payload).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn empty_choices_are_a_payload_error() {
        let payload: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(first_message(payload), Err(CollaboratorError::Payload(_))));
    }
}
