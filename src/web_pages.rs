use std::path::Path;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path as UrlPath, Query, State},
    http::{HeaderMap, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::services::ServeDir;

use crate::config::Locale;
use crate::html::{escape_html, fill_template};
use crate::model::{ChannelContent, GenerationOutcome, GenerationRequest, StatusReport};
use crate::orchestrator::Orchestrator;

const INDEX_HTML: &str = include_str!("../templates/index.html");
const RESULTS_HTML: &str = include_str!("../templates/results.html");

pub fn router(orchestrator: Orchestrator, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/generate", post(handle_generate))
        .route("/status/{job_id}", get(handle_status))
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(orchestrator)
}

pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Fields of the generation form. `channels` may repeat.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GenerateForm {
    pub product_name: String,
    pub channels: Vec<String>,
}

impl GenerateForm {
    pub fn parse(body: &[u8]) -> Self {
        let mut form = Self::default();
        for (key, value) in url::form_urlencoded::parse(body) {
            match key.as_ref() {
                "product_name" => form.product_name = value.into_owned(),
                "channels" | "channels[]" => form.channels.push(value.into_owned()),
                _ => {}
            }
        }
        form
    }
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| accept.contains("application/json"))
        .unwrap_or(false)
}

pub async fn handle_generate(
    State(orchestrator): State<Orchestrator>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let form = GenerateForm::parse(&body);
    let Some(request) = GenerationRequest::new(&form.product_name, form.channels) else {
        return Redirect::to("/").into_response();
    };
    let outcome = orchestrator.generate(&request).await;
    if wants_json(&headers) {
        return Json(outcome).into_response();
    }
    Html(render_results(&outcome, &orchestrator.settings().locales)).into_response()
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub product: Option<String>,
}

pub async fn handle_status(
    State(orchestrator): State<Orchestrator>,
    UrlPath(job_id): UrlPath<String>,
    Query(query): Query<StatusQuery>,
) -> Json<StatusReport> {
    Json(orchestrator.check_render(&job_id, query.product.as_deref()).await)
}

pub fn render_results(outcome: &GenerationOutcome, locales: &[Locale]) -> String {
    let product = escape_html(&outcome.product_name);

    let images = if outcome.images.is_empty() {
        String::new()
    } else {
        outcome
            .images
            .iter()
            .map(|url| {
                format!(
                    "<img src=\"{src}\" alt=\"{product}\" loading=\"lazy\">",
                    src = escape_html(url)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    let channels = outcome
        .contents
        .iter()
        .map(|content| render_channel(content, locales))
        .collect::<Vec<_>>()
        .join("\n");

    let video = match &outcome.render_job {
        Some(job) => format!(
            "<div id=\"video\" data-job-id=\"{job_id}\" data-product=\"{product}\">\
<p class=\"pending\">Rendering video…</p></div>",
            job_id = escape_html(&job.job_id)
        ),
        None => "<div id=\"video\"><p class=\"none\">No video is pending for this product.</p></div>".to_string(),
    };

    fill_template(
        RESULTS_HTML,
        &[
            ("product_name", product.as_str()),
            ("images", images.as_str()),
            ("channels", channels.as_str()),
            ("video", video.as_str()),
        ],
    )
}

fn render_channel(content: &ChannelContent, locales: &[Locale]) -> String {
    let mut html = format!(
        "<article class=\"channel\"><h3>{}</h3>",
        escape_html(&content.channel)
    );
    for locale in locales {
        let Some(variant) = content.variants.get(&locale.tag) else {
            continue;
        };
        html.push_str(&format!(
            "<div class=\"variant\" lang=\"{tag}\"><h4>{language}</h4>\
<p class=\"hook\">{hook}</p><p class=\"caption\">{caption}</p>\
<p class=\"hashtags\">{hashtags}</p><p class=\"emojis\">{emojis}</p></div>",
            tag = escape_html(&locale.tag),
            language = escape_html(&locale.language),
            hook = escape_html(&variant.hook),
            caption = escape_html(&variant.caption),
            hashtags = escape_html(&variant.hashtags),
            emojis = escape_html(&variant.emojis),
        ));
    }
    html.push_str("</article>");
    html
}
