use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::{AppConfig, require};
use crate::error::{CollaboratorResult, ConfigError};
use crate::providers::{ImageSearch, assert_ok_response};

const PEXELS_SEARCH_URL: &str = "https://api.pexels.com/v1/search";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large: Option<String>,
    original: Option<String>,
}

pub struct PexelsSearch {
    client: Client,
    api_key: String,
}

impl PexelsSearch {
    pub fn new(client: Client, config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            api_key: require(&config.pexels_api_key, "PEXELS_API_KEY")?,
        })
    }
}

const MAX_PER_PAGE: usize = 80;

fn page_size(count: usize) -> usize {
    count.clamp(1, MAX_PER_PAGE)
}

fn image_urls(payload: SearchResponse) -> Vec<String> {
    payload
        .photos
        .into_iter()
        .filter_map(|photo| photo.src.large.or(photo.src.original))
        .collect()
}

#[async_trait]
impl ImageSearch for PexelsSearch {
    async fn search(&self, query: &str, count: usize) -> CollaboratorResult<Vec<String>> {
        let per_page = page_size(count).to_string();
        let response = self
            .client
            .get(PEXELS_SEARCH_URL)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .query(&[("query", query), ("page", "1"), ("per_page", per_page.as_str())])
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let payload: SearchResponse = response.json().await?;
        debug!(query, results = payload.photos.len(), "pexels search answered");
        Ok(image_urls(payload))
    }
}
