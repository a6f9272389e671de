use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::{AppConfig, CloudinaryCredentials};
use crate::error::{CollaboratorError, CollaboratorResult, ConfigError};
use crate::providers::{MediaHost, assert_ok_response};

const CLOUDINARY_API_ROOT: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

pub struct CloudinaryHost {
    client: Client,
    credentials: CloudinaryCredentials,
}

impl CloudinaryHost {
    pub fn new(client: Client, config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            credentials: config.cloudinary()?,
        })
    }
}

/// Hex SHA-256 over the alphabetically sorted `key=value` pairs joined by
/// `&`, with the API secret appended.
pub fn sign_params(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");
    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

fn hosted_url(payload: UploadResponse) -> CollaboratorResult<String> {
    payload
        .secure_url
        .or(payload.url)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| CollaboratorError::Payload("Cloudinary returned no asset url".to_string()))
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, source_url: &str, identifier: &str) -> CollaboratorResult<String> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = sign_params(
            &[("public_id", identifier), ("timestamp", timestamp.as_str())],
            &self.credentials.api_secret,
        );
        let response = self
            .client
            .post(format!(
                "{CLOUDINARY_API_ROOT}/{}/video/upload",
                self.credentials.cloud_name
            ))
            .form(&[
                ("file", source_url),
                ("public_id", identifier),
                ("timestamp", timestamp.as_str()),
                ("api_key", self.credentials.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let payload: UploadResponse = response.json().await?;
        hosted_url(payload)
    }
}
