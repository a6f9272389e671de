use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::{AppConfig, require};
use crate::error::{CollaboratorResult, ConfigError};
use crate::providers::{ImageSearch, assert_ok_response};

const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    urls: PhotoUrls,
}

#[derive(Debug, Deserialize)]
struct PhotoUrls {
    regular: Option<String>,
    full: Option<String>,
}

pub struct UnsplashSearch {
    client: Client,
    access_key: String,
}

impl UnsplashSearch {
    pub fn new(client: Client, config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            access_key: require(&config.unsplash_access_key, "UNSPLASH_ACCESS_KEY")?,
        })
    }
}

const MAX_PER_PAGE: usize = 30;

fn page_size(count: usize) -> usize {
    count.clamp(1, MAX_PER_PAGE)
}

fn image_urls(payload: SearchResponse) -> Vec<String> {
    payload
        .results
        .into_iter()
        .filter_map(|photo| photo.urls.regular.or(photo.urls.full))
        .collect()
}

#[async_trait]
impl ImageSearch for UnsplashSearch {
    async fn search(&self, query: &str, count: usize) -> CollaboratorResult<Vec<String>> {
        let per_page = page_size(count).to_string();
        let response = self
            .client
            .get(UNSPLASH_SEARCH_URL)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Client-ID {}", self.access_key),
            )
            .header("Accept-Version", "v1")
            .query(&[("query", query), ("page", "1"), ("per_page", per_page.as_str())])
            .send()
            .await?;
        let response = assert_ok_response(response).await?;
        let payload: SearchResponse = response.json().await?;
        debug!(query, results = payload.results.len(), "unsplash search answered");
        Ok(image_urls(payload))
    }
}
