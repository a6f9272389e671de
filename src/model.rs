use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::Locale;

pub const ERROR_HOOK: &str = "Error";
pub const ERROR_CAPTION: &str = "Could not generate text.";
pub const ERROR_EMOJIS: &str = "❌";

/// What the user asked for on one form submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    product_name: String,
    channels: Vec<String>,
}

impl GenerationRequest {
    /// Returns `None` when the product name is blank or no channel is given.
    pub fn new(product_name: &str, channels: Vec<String>) -> Option<Self> {
        let product_name = product_name.trim();
        let channels: Vec<String> = channels
            .into_iter()
            .map(|channel| channel.trim().to_string())
            .filter(|channel| !channel.is_empty())
            .collect();
        if product_name.is_empty() || channels.is_empty() {
            return None;
        }
        Some(Self {
            product_name: product_name.to_string(),
            channels,
        })
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }
}

pub type ImageSet = Vec<String>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LocaleVariant {
    pub hook: String,
    pub caption: String,
    pub hashtags: String,
    pub emojis: String,
}

impl LocaleVariant {
    pub fn error_marker() -> Self {
        Self {
            hook: ERROR_HOOK.to_string(),
            caption: ERROR_CAPTION.to_string(),
            hashtags: String::new(),
            emojis: ERROR_EMOJIS.to_string(),
        }
    }

    pub fn is_error_marker(&self) -> bool {
        *self == Self::error_marker()
    }
}

/// Generated copy for one channel, keyed by locale tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChannelContent {
    pub channel: String,
    pub variants: BTreeMap<String, LocaleVariant>,
}

impl ChannelContent {
    /// Placeholder used whenever generation or parsing fails for a channel.
    pub fn error_marker(channel: &str, locales: &[Locale]) -> Self {
        Self {
            channel: channel.to_string(),
            variants: locales
                .iter()
                .map(|locale| (locale.tag.clone(), LocaleVariant::error_marker()))
                .collect(),
        }
    }

    pub fn is_error_marker(&self) -> bool {
        !self.variants.is_empty() && self.variants.values().all(LocaleVariant::is_error_marker)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderJob {
    pub job_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderStatus {
    Submitted,
    Queued,
    Rendering,
    Done { url: String },
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PublishedAsset {
    pub url: String,
}

/// Everything the results page shows for one request.
#[derive(Clone, Debug, Serialize)]
pub struct GenerationOutcome {
    pub product_name: String,
    pub images: ImageSet,
    pub contents: Vec<ChannelContent>,
    pub render_job: Option<RenderJob>,
}

/// Render state as the browser sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Rendering,
    Done,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub status: ClientStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl StatusReport {
    pub fn rendering() -> Self {
        Self {
            status: ClientStatus::Rendering,
            url: None,
        }
    }

    pub fn failed() -> Self {
        Self {
            status: ClientStatus::Failed,
            url: None,
        }
    }

    pub fn done(url: String) -> Self {
        Self {
            status: ClientStatus::Done,
            url: Some(url),
        }
    }
}
