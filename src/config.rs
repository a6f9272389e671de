use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_IMAGE_COUNT: usize = 5;
/// Largest page either image provider serves in one request.
pub const MAX_IMAGE_COUNT: usize = 30;
const DEFAULT_TEXT_TIMEOUT_SECS: u64 = 45;
const DEFAULT_LOCALES: &str = "el:Greek,en:English";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageProviderKind {
    Pexels,
    Unsplash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextProviderKind {
    OpenAi,
    Gemini,
}

/// One language rendering requested for every channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Locale {
    /// Key used in prompts, replies and templates, e.g. `en`.
    pub tag: String,
    /// Human name handed to the model, e.g. `English`.
    pub language: String,
}

impl Locale {
    pub fn new(tag: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            language: language.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CloudinaryCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Process-wide settings, read once at startup.
///
/// Credentials stay optional here; [`crate::providers::Collaborators::from_config`]
/// rejects a missing one for the providers actually selected.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub static_dir: PathBuf,
    pub image_provider: ImageProviderKind,
    pub text_provider: TextProviderKind,
    pub pexels_api_key: Option<String>,
    pub unsplash_access_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub shotstack_api_key: Option<String>,
    pub shotstack_stage: String,
    pub cloudinary_cloud_name: Option<String>,
    pub cloudinary_api_key: Option<String>,
    pub cloudinary_api_secret: Option<String>,
    pub cloudinary_folder: String,
    pub locales: Vec<Locale>,
    pub image_count: usize,
    pub text_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source. Blank values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get("PROMO_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                var: "PROMO_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };
        let image_count = match get("IMAGE_COUNT") {
            Some(value) => match value.parse::<usize>() {
                Ok(count) if (1..=MAX_IMAGE_COUNT).contains(&count) => count,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "IMAGE_COUNT",
                        value,
                    });
                }
            },
            None => DEFAULT_IMAGE_COUNT,
        };
        let text_timeout = match get("TEXT_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "TEXT_TIMEOUT_SECS",
                        value,
                    });
                }
            },
            None => Duration::from_secs(DEFAULT_TEXT_TIMEOUT_SECS),
        };

        let image_provider = match get("IMAGE_PROVIDER").as_deref().map(str::to_ascii_lowercase) {
            None => ImageProviderKind::Pexels,
            Some(value) => match value.as_str() {
                "pexels" => ImageProviderKind::Pexels,
                "unsplash" => ImageProviderKind::Unsplash,
                _ => {
                    return Err(ConfigError::UnknownProvider {
                        kind: "image",
                        value,
                    });
                }
            },
        };
        let text_provider = match get("TEXT_PROVIDER").as_deref().map(str::to_ascii_lowercase) {
            None => TextProviderKind::OpenAi,
            Some(value) => match value.as_str() {
                "openai" => TextProviderKind::OpenAi,
                "gemini" => TextProviderKind::Gemini,
                _ => {
                    return Err(ConfigError::UnknownProvider {
                        kind: "text",
                        value,
                    });
                }
            },
        };

        let locales_raw = get("PROMO_LOCALES").unwrap_or_else(|| DEFAULT_LOCALES.to_string());
        let locales = parse_locales(&locales_raw).ok_or(ConfigError::InvalidValue {
            var: "PROMO_LOCALES",
            value: locales_raw.clone(),
        })?;

        Ok(Self {
            port,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            image_provider,
            text_provider,
            pexels_api_key: get("PEXELS_API_KEY"),
            unsplash_access_key: get("UNSPLASH_ACCESS_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            openai_model: get("OPENAI_MODEL").unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string()),
            shotstack_api_key: get("SHOTSTACK_API_KEY"),
            shotstack_stage: get("SHOTSTACK_STAGE").unwrap_or_else(|| "v1".to_string()),
            cloudinary_cloud_name: get("CLOUDINARY_CLOUD_NAME"),
            cloudinary_api_key: get("CLOUDINARY_API_KEY"),
            cloudinary_api_secret: get("CLOUDINARY_API_SECRET"),
            cloudinary_folder: get("CLOUDINARY_FOLDER").unwrap_or_else(|| "promo".to_string()),
            locales,
            image_count,
            text_timeout,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn cloudinary(&self) -> Result<CloudinaryCredentials, ConfigError> {
        Ok(CloudinaryCredentials {
            cloud_name: require(&self.cloudinary_cloud_name, "CLOUDINARY_CLOUD_NAME")?,
            api_key: require(&self.cloudinary_api_key, "CLOUDINARY_API_KEY")?,
            api_secret: require(&self.cloudinary_api_secret, "CLOUDINARY_API_SECRET")?,
        })
    }
}

pub fn require(value: &Option<String>, var: &'static str) -> Result<String, ConfigError> {
    value
        .clone()
        .ok_or(ConfigError::MissingCredential { var })
}

/// Parses `tag:Language,tag:Language`. Returns `None` for an empty list,
/// a malformed entry or a repeated tag.
fn parse_locales(raw: &str) -> Option<Vec<Locale>> {
    let mut locales: Vec<Locale> = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (tag, language) = entry.split_once(':')?;
        let (tag, language) = (tag.trim(), language.trim());
        if tag.is_empty() || language.is_empty() {
            return None;
        }
        if locales.iter().any(|locale| locale.tag == tag) {
            return None;
        }
        locales.push(Locale::new(tag, language));
    }
    if locales.is_empty() { None } else { Some(locales) }
}
