//! Third-party collaborators behind one capability trait each.
//!
//! The orchestrator only sees the traits; which concrete provider backs a
//! trait is chosen from [`AppConfig`] at startup.

pub mod cloudinary;
pub mod gemini;
pub mod openai;
pub mod pexels;
pub mod shotstack;
pub mod unsplash;

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::config::{AppConfig, ImageProviderKind, TextProviderKind};
use crate::error::{CollaboratorError, CollaboratorResult, ConfigError};
use crate::prompt::ReplyFormat;
use crate::timeline::{OutputSpec, Timeline};

pub use cloudinary::CloudinaryHost;
pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;
pub use pexels::PexelsSearch;
pub use shotstack::ShotstackRenderer;
pub use unsplash::UnsplashSearch;

#[async_trait]
pub trait ImageSearch: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> CollaboratorResult<Vec<String>>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Layout the prompt must request and the reply is parsed with.
    fn reply_format(&self) -> ReplyFormat;

    async fn complete(&self, prompt: &str) -> CollaboratorResult<String>;
}

/// Render state exactly as the provider reported it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderRenderState {
    pub status: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait VideoRenderer: Send + Sync {
    async fn submit(&self, timeline: &Timeline, output: &OutputSpec) -> CollaboratorResult<String>;

    async fn get_status(&self, job_id: &str) -> CollaboratorResult<ProviderRenderState>;
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, source_url: &str, identifier: &str) -> CollaboratorResult<String>;
}

/// The four collaborators one orchestrator works with.
#[derive(Clone)]
pub struct Collaborators {
    pub images: Arc<dyn ImageSearch>,
    pub text: Arc<dyn TextGenerator>,
    pub renderer: Arc<dyn VideoRenderer>,
    pub host: Arc<dyn MediaHost>,
}

impl Collaborators {
    /// Wires the configured providers, failing on the first missing credential.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        let images: Arc<dyn ImageSearch> = match config.image_provider {
            ImageProviderKind::Pexels => Arc::new(PexelsSearch::new(client.clone(), config)?),
            ImageProviderKind::Unsplash => Arc::new(UnsplashSearch::new(client.clone(), config)?),
        };
        let text: Arc<dyn TextGenerator> = match config.text_provider {
            TextProviderKind::OpenAi => Arc::new(OpenAiGenerator::new(client.clone(), config)?),
            TextProviderKind::Gemini => Arc::new(GeminiGenerator::new(client.clone(), config)?),
        };
        let renderer = Arc::new(ShotstackRenderer::new(client.clone(), config)?);
        let host = Arc::new(CloudinaryHost::new(client, config)?);

        Ok(Self {
            images,
            text,
            renderer,
            host,
        })
    }
}

pub(crate) async fn assert_ok_response(response: reqwest::Response) -> CollaboratorResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(CollaboratorError::Status { status, body })
}
