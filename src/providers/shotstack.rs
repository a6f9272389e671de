use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::config::{AppConfig, require};
use crate::error::{CollaboratorError, CollaboratorResult, ConfigError};
use crate::providers::{ProviderRenderState, VideoRenderer, assert_ok_response};
use crate::timeline::{OutputSpec, Timeline};

const SHOTSTACK_API_ROOT: &str = "https://api.shotstack.io";

#[derive(Serialize)]
struct RenderRequest<'a> {
    timeline: &'a Timeline,
    output: &'a OutputSpec,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: Option<bool>,
    message: Option<String>,
    response: Option<T>,
}

#[derive(Debug, Deserialize)]
struct QueuedRender {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RenderInfo {
    status: Option<String>,
    url: Option<String>,
}

pub struct ShotstackRenderer {
    client: Client,
    api_key: String,
    stage: String,
}

impl ShotstackRenderer {
    pub fn new(client: Client, config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            api_key: require(&config.shotstack_api_key, "SHOTSTACK_API_KEY")?,
            stage: config.shotstack_stage.clone(),
        })
    }

    fn render_url(&self) -> String {
        format!("{SHOTSTACK_API_ROOT}/{}/render", self.stage)
    }

    /// Status endpoint for one render. The id is appended as a single
    /// percent-encoded path segment.
    fn status_url(&self, job_id: &str) -> CollaboratorResult<Url> {
        let mut url = Url::parse(&self.render_url())
            .map_err(|err| CollaboratorError::Payload(format!("invalid render url: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| CollaboratorError::Payload("render url cannot take a path".to_string()))?
            .push(job_id);
        Ok(url)
    }
}

fn unwrap_envelope<T>(envelope: Envelope<T>) -> CollaboratorResult<T> {
    if envelope.success == Some(false) {
        return Err(CollaboratorError::Payload(format!(
            "Shotstack rejected the request: {}",
            envelope.message.unwrap_or_default()
        )));
    }
    envelope
        .response
        .ok_or_else(|| CollaboratorError::Payload("Shotstack returned no response body".to_string()))
}

fn render_id(envelope: Envelope<QueuedRender>) -> CollaboratorResult<String> {
    unwrap_envelope(envelope)?
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| CollaboratorError::Payload("Shotstack returned no render id".to_string()))
}

fn render_state(envelope: Envelope<RenderInfo>) -> CollaboratorResult<ProviderRenderState> {
    let info = unwrap_envelope(envelope)?;
    let status = info
        .status
        .ok_or_else(|| CollaboratorError::Payload("Shotstack returned no render status".to_string()))?;
    Ok(ProviderRenderState {
        status,
        url: info.url.filter(|url| !url.trim().is_empty()),
    })
}

#[async_trait]
impl VideoRenderer for ShotstackRenderer {
    async fn submit(&self, timeline: &Timeline, output: &OutputSpec) -> CollaboratorResult<String> {
        let response = self
            .client
            .post(self.render_url())
            .header("x-api-key", &self.api_key)
            .json(&RenderRequest { timeline, output })
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let envelope: Envelope<QueuedRender> = response.json().await?;
        render_id(envelope)
    }

    async fn get_status(&self, job_id: &str) -> CollaboratorResult<ProviderRenderState> {
        let response = self
            .client
            .get(self.status_url(job_id)?)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let envelope: Envelope<RenderInfo> = response.json().await?;
        let state = render_state(envelope)?;
        debug!(job_id, status = %state.status, "shotstack render status");
        Ok(state)
    }
}
