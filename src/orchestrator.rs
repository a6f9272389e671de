//! Chains the four collaborators into one marketing package.
//!
//! Every collaborator failure is logged and turned into an empty or
//! fallback value here; nothing below the HTTP layer returns an error for
//! a failed third-party call.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, Locale};
use crate::error::CollaboratorError;
use crate::model::{
    ChannelContent, GenerationOutcome, GenerationRequest, ImageSet, PublishedAsset, RenderJob,
    RenderStatus, StatusReport,
};
use crate::prompt::{build_prompt, parse_reply};
use crate::providers::Collaborators;
use crate::publish_ledger::PublishLedger;
use crate::timeline::{OutputSpec, Timeline};

#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
    pub image_count: usize,
    pub locales: Vec<Locale>,
    pub text_timeout: Duration,
    pub hosting_folder: String,
    pub output: OutputSpec,
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            image_count: config.image_count,
            locales: config.locales.clone(),
            text_timeout: config.text_timeout,
            hosting_folder: config.cloudinary_folder.clone(),
            output: OutputSpec::default(),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            image_count: 5,
            locales: vec![Locale::new("el", "Greek"), Locale::new("en", "English")],
            text_timeout: Duration::from_secs(45),
            hosting_folder: "promo".to_string(),
            output: OutputSpec::default(),
        }
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    collaborators: Collaborators,
    settings: Arc<OrchestratorSettings>,
    ledger: PublishLedger,
}

impl Orchestrator {
    pub fn new(collaborators: Collaborators, settings: OrchestratorSettings) -> Self {
        Self {
            collaborators,
            settings: Arc::new(settings),
            ledger: PublishLedger::new(),
        }
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Images, per-channel copy and a render job for one request.
    ///
    /// Image search and text generation run concurrently; the render job
    /// needs the images and is submitted last.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let product_name = request.product_name();
        info!(
            product = product_name,
            channels = request.channels().len(),
            "generating marketing package"
        );
        let (images, contents) = tokio::join!(
            self.search_images(product_name, self.settings.image_count),
            self.generate_all_content(product_name, request.channels()),
        );
        let render_job = self.submit_render_job(product_name, &images).await;
        GenerationOutcome {
            product_name: product_name.to_string(),
            images,
            contents,
            render_job,
        }
    }

    pub async fn search_images(&self, query: &str, count: usize) -> ImageSet {
        let query = query.trim();
        if query.is_empty() || count == 0 {
            return Vec::new();
        }
        match self.collaborators.images.search(query, count).await {
            Ok(urls) => {
                if urls.is_empty() {
                    warn!(query, "image search returned no results");
                }
                urls
            }
            Err(err) => {
                warn!(query, error = %err, "image search failed");
                Vec::new()
            }
        }
    }

    pub async fn generate_content_for_channel(&self, product_name: &str, channel: &str) -> ChannelContent {
        let locales = &self.settings.locales;
        let format = self.collaborators.text.reply_format();
        let prompt = build_prompt(product_name, channel, locales, format);
        let budget = self.settings.text_timeout;

        let reply = match tokio::time::timeout(budget, self.collaborators.text.complete(&prompt)).await {
            Ok(result) => result,
            Err(_) => Err(CollaboratorError::Timeout(budget)),
        };
        let raw = match reply {
            Ok(raw) => raw,
            Err(err) => {
                warn!(channel, error = %err, "text generation failed");
                return ChannelContent::error_marker(channel, locales);
            }
        };
        match parse_reply(&raw, locales, format) {
            Ok(variants) => ChannelContent {
                channel: channel.to_string(),
                variants,
            },
            Err(err) => {
                warn!(channel, error = %err, "text generation reply did not parse");
                debug!(channel, reply = %raw, "unparsed reply");
                ChannelContent::error_marker(channel, locales)
            }
        }
    }

    /// One entry per channel, in request order, whatever fails.
    pub async fn generate_all_content(&self, product_name: &str, channels: &[String]) -> Vec<ChannelContent> {
        let total = channels.len();
        let mut join_set = JoinSet::new();
        for (index, channel) in channels.iter().enumerate() {
            let orchestrator = self.clone();
            let product_name = product_name.to_string();
            let channel = channel.clone();
            join_set.spawn(async move {
                let content = orchestrator
                    .generate_content_for_channel(&product_name, &channel)
                    .await;
                (index, content)
            });
        }

        let mut results: Vec<Option<ChannelContent>> = std::iter::repeat_with(|| None).take(total).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, content)) => results[index] = Some(content),
                Err(err) => warn!(error = %err, "channel generation task failed"),
            }
        }

        results
            .into_iter()
            .zip(channels)
            .map(|(content, channel)| {
                content.unwrap_or_else(|| ChannelContent::error_marker(channel, &self.settings.locales))
            })
            .collect()
    }

    /// Returns `None` without calling the renderer when there are no images.
    pub async fn submit_render_job(&self, product_name: &str, images: &[String]) -> Option<RenderJob> {
        if images.is_empty() {
            info!(product = product_name, "no images, skipping video render");
            return None;
        }
        let timeline = Timeline::slideshow(product_name, images);
        match self
            .collaborators
            .renderer
            .submit(&timeline, &self.settings.output)
            .await
        {
            Ok(job_id) => {
                info!(product = product_name, job_id = %job_id, clips = images.len(), "video render submitted");
                Some(RenderJob { job_id })
            }
            Err(err) => {
                warn!(product = product_name, error = %err, "video render submission failed");
                None
            }
        }
    }

    pub async fn poll_render_status(&self, job_id: &str) -> RenderStatus {
        if !is_valid_job_id(job_id) {
            warn!(job_id, "rejecting malformed render job id");
            return RenderStatus::Failed;
        }
        match self.collaborators.renderer.get_status(job_id).await {
            Ok(state) => {
                let status = map_provider_status(&state.status, state.url);
                if status == RenderStatus::Failed {
                    warn!(job_id, provider_status = %state.status, "render reported as failed");
                }
                status
            }
            Err(err) => {
                warn!(job_id, error = %err, "render status unavailable");
                RenderStatus::Failed
            }
        }
    }

    /// Uploads the rendered video; on failure the renderer's own URL is kept.
    pub async fn publish_rendered_asset(&self, rendered_url: &str, product_name: &str) -> PublishedAsset {
        let identifier = asset_identifier(&self.settings.hosting_folder, product_name, Utc::now().timestamp());
        match self.collaborators.host.upload(rendered_url, &identifier).await {
            Ok(url) => {
                info!(identifier = %identifier, url = %url, "rendered video published");
                PublishedAsset { url }
            }
            Err(err) => {
                warn!(identifier = %identifier, error = %err, "upload failed, keeping render url");
                PublishedAsset {
                    url: rendered_url.to_string(),
                }
            }
        }
    }

    /// Status as served to the browser; publishes the video the first time
    /// the job is seen done.
    pub async fn check_render(&self, job_id: &str, product_name: Option<&str>) -> StatusReport {
        if let Some(asset) = self.ledger.get(job_id) {
            return StatusReport::done(asset.url);
        }
        match self.poll_render_status(job_id).await {
            RenderStatus::Submitted | RenderStatus::Queued | RenderStatus::Rendering => StatusReport::rendering(),
            RenderStatus::Failed => StatusReport::failed(),
            RenderStatus::Done { url } => {
                let name = product_name
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .unwrap_or(job_id);
                let asset = self
                    .ledger
                    .publish_once(job_id, || self.publish_rendered_asset(&url, name))
                    .await;
                StatusReport::done(asset.url)
            }
        }
    }
}

/// Render ids are opaque but only ever made of ASCII letters, digits, `-` and `_`.
pub fn is_valid_job_id(job_id: &str) -> bool {
    !job_id.is_empty()
        && job_id.len() <= 128
        && job_id
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

/// Provider state names to [`RenderStatus`]. Unknown names and `done`
/// without a URL are failures.
pub fn map_provider_status(status: &str, url: Option<String>) -> RenderStatus {
    match status.trim().to_ascii_lowercase().as_str() {
        "submitted" => RenderStatus::Submitted,
        "queued" => RenderStatus::Queued,
        "fetching" | "rendering" | "saving" => RenderStatus::Rendering,
        "done" => match url {
            Some(url) => RenderStatus::Done { url },
            None => RenderStatus::Failed,
        },
        _ => RenderStatus::Failed,
    }
}

/// `{folder}/{name}_{timestamp}` with whitespace runs in the name replaced by `_`.
pub fn asset_identifier(folder: &str, product_name: &str, timestamp: i64) -> String {
    let name = product_name.split_whitespace().collect::<Vec<_>>().join("_");
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{name}_{timestamp}")
    } else {
        format!("{folder}/{name}_{timestamp}")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::error::CollaboratorResult;
    use crate::prompt::ReplyFormat;
    use crate::providers::{ImageSearch, MediaHost, ProviderRenderState, TextGenerator, VideoRenderer};

    const GOOD_REPLY: &str = r##"{"el": {"hook": "Γεια", "caption": "Νέο", "hashtags": "#nova", "emojis": "🔥"},
        "en": {"hook": "Hello", "caption": "New", "hashtags": "#nova", "emojis": "🔥"}}"##;

    struct FakeImages {
        urls: Option<Vec<String>>,
        calls: AtomicUsize,
        last_request: Mutex<Option<(String, usize)>>,
    }

    impl FakeImages {
        fn returning(urls: Option<Vec<String>>) -> Arc<Self> {
            Arc::new(Self {
                urls,
                calls: AtomicUsize::new(0),
                last_request: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ImageSearch for FakeImages {
        async fn search(&self, query: &str, count: usize) -> CollaboratorResult<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().unwrap() = Some((query.to_string(), count));
            self.urls
                .clone()
                .ok_or_else(|| CollaboratorError::Payload("search down".into()))
        }
    }

    type Reply = Box<dyn Fn(&str) -> CollaboratorResult<String> + Send + Sync>;

    struct FakeText {
        reply: Reply,
        delay: Option<Duration>,
    }

    impl FakeText {
        fn new(reply: impl Fn(&str) -> CollaboratorResult<String> + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self {
                reply: Box::new(reply),
                delay: None,
            })
        }
    }

    #[async_trait]
    impl TextGenerator for FakeText {
        fn reply_format(&self) -> ReplyFormat {
            ReplyFormat::Json
        }

        async fn complete(&self, prompt: &str) -> CollaboratorResult<String> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            (self.reply)(prompt)
        }
    }

    struct FakeRenderer {
        job_id: Option<String>,
        state: Mutex<Option<ProviderRenderState>>,
        submit_calls: AtomicUsize,
        status_calls: AtomicUsize,
        last_timeline: Mutex<Option<Timeline>>,
    }

    impl FakeRenderer {
        fn new(job_id: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                job_id: job_id.map(str::to_string),
                state: Mutex::new(None),
                submit_calls: AtomicUsize::new(0),
                status_calls: AtomicUsize::new(0),
                last_timeline: Mutex::new(None),
            })
        }

        fn report(&self, status: &str, url: Option<&str>) {
            *self.state.lock().unwrap() = Some(ProviderRenderState {
                status: status.to_string(),
                url: url.map(str::to_string),
            });
        }
    }

    #[async_trait]
    impl VideoRenderer for FakeRenderer {
        async fn submit(&self, timeline: &Timeline, _output: &OutputSpec) -> CollaboratorResult<String> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_timeline.lock().unwrap() = Some(timeline.clone());
            self.job_id
                .clone()
                .ok_or_else(|| CollaboratorError::Payload("render rejected".into()))
        }

        async fn get_status(&self, _job_id: &str) -> CollaboratorResult<ProviderRenderState> {
            self.status_calls.fetch_add(1, Ordering::SeqCst);
            self.state
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| CollaboratorError::Payload("unreachable".into()))
        }
    }

    struct FakeHost {
        hosted_url: Option<String>,
        calls: AtomicUsize,
        last_identifier: Mutex<Option<String>>,
    }

    impl FakeHost {
        fn new(hosted_url: Option<&str>) -> Arc<Self> {
            Arc::new(Self {
                hosted_url: hosted_url.map(str::to_string),
                calls: AtomicUsize::new(0),
                last_identifier: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl MediaHost for FakeHost {
        async fn upload(&self, _source_url: &str, identifier: &str) -> CollaboratorResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_identifier.lock().unwrap() = Some(identifier.to_string());
            self.hosted_url
                .clone()
                .ok_or_else(|| CollaboratorError::Payload("upload rejected".into()))
        }
    }

    struct Harness {
        images: Arc<FakeImages>,
        renderer: Arc<FakeRenderer>,
        host: Arc<FakeHost>,
        orchestrator: Orchestrator,
    }

    fn harness_with(
        images: Arc<FakeImages>,
        text: Arc<FakeText>,
        renderer: Arc<FakeRenderer>,
        host: Arc<FakeHost>,
        settings: OrchestratorSettings,
    ) -> Harness {
        let collaborators = Collaborators {
            images: images.clone(),
            text,
            renderer: renderer.clone(),
            host: host.clone(),
        };
        Harness {
            images,
            renderer,
            host,
            orchestrator: Orchestrator::new(collaborators, settings),
        }
    }

    fn harness() -> Harness {
        harness_with(
            FakeImages::returning(Some(vec!["https://img/1.jpg".into()])),
            FakeText::new(|_| Ok(GOOD_REPLY.to_string())),
            FakeRenderer::new(Some("render-123")),
            FakeHost::new(Some("https://hosted/video.mp4")),
            OrchestratorSettings::default(),
        )
    }

    fn five_urls() -> Vec<String> {
        (1..=5).map(|i| format!("https://img/{i}.jpg")).collect()
    }

    #[tokio::test]
    async fn search_returns_urls_in_received_order() {
        let h = harness_with(
            FakeImages::returning(Some(five_urls())),
            FakeText::new(|_| Ok(GOOD_REPLY.to_string())),
            FakeRenderer::new(None),
            FakeHost::new(None),
            OrchestratorSettings::default(),
        );
        let urls = h.orchestrator.search_images("AeroRun 3", 5).await;
        assert_eq!(urls, five_urls());
        assert_eq!(
            *h.images.last_request.lock().unwrap(),
            Some(("AeroRun 3".to_string(), 5))
        );
    }

    #[tokio::test]
    async fn search_failure_yields_empty_set() {
        let h = harness_with(
            FakeImages::returning(None),
            FakeText::new(|_| Ok(GOOD_REPLY.to_string())),
            FakeRenderer::new(None),
            FakeHost::new(None),
            OrchestratorSettings::default(),
        );
        assert!(h.orchestrator.search_images("AeroRun 3", 5).await.is_empty());
    }

    #[tokio::test]
    async fn blank_query_skips_the_search() {
        let h = harness();
        assert!(h.orchestrator.search_images("   ", 5).await.is_empty());
        assert_eq!(h.images.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn parses_channel_content() {
        let h = harness();
        let content = h.orchestrator.generate_content_for_channel("Nova X", "Instagram").await;
        assert_eq!(content.channel, "Instagram");
        assert_eq!(content.variants["el"].hook, "Γεια");
        assert_eq!(content.variants["en"].caption, "New");
        assert!(!content.is_error_marker());
    }

    #[tokio::test]
    async fn garbage_reply_becomes_error_marker() {
        let h = harness_with(
            FakeImages::returning(Some(Vec::new())),
            FakeText::new(|_| Ok("<<<not json at all>>>".to_string())),
            FakeRenderer::new(None),
            FakeHost::new(None),
            OrchestratorSettings::default(),
        );
        let content = h.orchestrator.generate_content_for_channel("Nova X", "TikTok").await;
        assert_eq!(content.channel, "TikTok");
        assert_eq!(content.variants.len(), 2);
        assert!(content.is_error_marker());
    }

    #[tokio::test]
    async fn slow_reply_past_budget_becomes_error_marker() {
        let text = Arc::new(FakeText {
            reply: Box::new(|_: &str| Ok(GOOD_REPLY.to_string())),
            delay: Some(Duration::from_secs(10)),
        });
        let settings = OrchestratorSettings {
            text_timeout: Duration::from_millis(20),
            ..OrchestratorSettings::default()
        };
        let h = harness_with(
            FakeImages::returning(Some(Vec::new())),
            text,
            FakeRenderer::new(None),
            FakeHost::new(None),
            settings,
        );
        let content = h.orchestrator.generate_content_for_channel("Nova X", "TikTok").await;
        assert!(content.is_error_marker());
    }

    #[tokio::test]
    async fn all_content_keeps_order_and_count_when_one_channel_fails() {
        let h = harness_with(
            FakeImages::returning(Some(Vec::new())),
            FakeText::new(|prompt| {
                if prompt.contains("platform: Instagram") {
                    Err(CollaboratorError::Payload("boom".into()))
                } else {
                    Ok(GOOD_REPLY.to_string())
                }
            }),
            FakeRenderer::new(None),
            FakeHost::new(None),
            OrchestratorSettings::default(),
        );
        let channels = vec!["Instagram".to_string(), "TikTok".to_string()];
        let contents = h.orchestrator.generate_all_content("Nova X", &channels).await;
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].channel, "Instagram");
        assert_eq!(contents[1].channel, "TikTok");
        assert_eq!(contents.iter().filter(|c| c.is_error_marker()).count(), 1);
        assert!(contents[0].is_error_marker());
    }

    #[tokio::test]
    async fn all_content_matches_channel_count_when_everything_fails() {
        let h = harness_with(
            FakeImages::returning(Some(Vec::new())),
            FakeText::new(|_| Err(CollaboratorError::Payload("down".into()))),
            FakeRenderer::new(None),
            FakeHost::new(None),
            OrchestratorSettings::default(),
        );
        let channels: Vec<String> = ["A", "B", "C", "A"].iter().map(|c| c.to_string()).collect();
        let contents = h.orchestrator.generate_all_content("Nova X", &channels).await;
        let names: Vec<&str> = contents.iter().map(|c| c.channel.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "A"]);
        assert!(contents.iter().all(ChannelContent::is_error_marker));
    }

    #[tokio::test]
    async fn empty_image_set_never_reaches_the_renderer() {
        let h = harness();
        assert_eq!(h.orchestrator.submit_render_job("Nova X", &[]).await, None);
        assert_eq!(h.renderer.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn submits_one_clip_per_image() {
        let h = harness();
        let job = h.orchestrator.submit_render_job("Nova X", &five_urls()).await;
        assert_eq!(job, Some(RenderJob { job_id: "render-123".into() }));
        let timeline = h.renderer.last_timeline.lock().unwrap().clone().unwrap();
        assert_eq!(timeline.tracks[0].clips.len(), 5);
        assert_eq!(timeline.duration(), 10.0);
    }

    #[tokio::test]
    async fn rejected_submission_yields_no_job() {
        let h = harness_with(
            FakeImages::returning(Some(Vec::new())),
            FakeText::new(|_| Ok(GOOD_REPLY.to_string())),
            FakeRenderer::new(None),
            FakeHost::new(None),
            OrchestratorSettings::default(),
        );
        assert_eq!(h.orchestrator.submit_render_job("Nova X", &five_urls()).await, None);
        assert_eq!(h.renderer.submit_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_renderer_polls_as_failed() {
        let h = harness();
        assert_eq!(h.orchestrator.poll_render_status("render-123").await, RenderStatus::Failed);
    }

    #[test]
    fn job_ids_are_restricted_to_id_characters() {
        assert!(is_valid_job_id("d2b46ed6-998a-4d6b-9d91-b8cf0193a655"));
        assert!(is_valid_job_id("render_123"));
        assert!(!is_valid_job_id(""));
        assert!(!is_valid_job_id("../../v1/sources?x="));
        assert!(!is_valid_job_id("abc def"));
        assert!(!is_valid_job_id(&"a".repeat(129)));
    }

    #[tokio::test]
    async fn malformed_job_id_never_reaches_the_renderer() {
        let h = harness();
        h.renderer.report("done", Some("https://render/v.mp4"));
        let report = h.orchestrator.check_render("../../v1/sources?x=", None).await;
        assert_eq!(report, StatusReport::failed());
        assert_eq!(h.renderer.status_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.host.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn publish_returns_hosted_url() {
        let h = harness();
        let asset = h
            .orchestrator
            .publish_rendered_asset("https://render/v.mp4", "Nova  X")
            .await;
        assert_eq!(asset.url, "https://hosted/video.mp4");
        let identifier = h.host.last_identifier.lock().unwrap().clone().unwrap();
        assert!(identifier.starts_with("promo/Nova_X_"), "{identifier}");
    }

    #[tokio::test]
    async fn failed_publish_falls_back_to_render_url() {
        let h = harness_with(
            FakeImages::returning(Some(Vec::new())),
            FakeText::new(|_| Ok(GOOD_REPLY.to_string())),
            FakeRenderer::new(None),
            FakeHost::new(None),
            OrchestratorSettings::default(),
        );
        let asset = h
            .orchestrator
            .publish_rendered_asset("https://render/v.mp4", "Nova X")
            .await;
        assert_eq!(asset.url, "https://render/v.mp4");
    }

    #[tokio::test]
    async fn check_render_collapses_pending_states() {
        let h = harness();
        for state in ["submitted", "queued", "fetching", "rendering", "saving"] {
            h.renderer.report(state, None);
            assert_eq!(h.orchestrator.check_render("render-123", None).await, StatusReport::rendering());
        }
        h.renderer.report("failed", None);
        assert_eq!(h.orchestrator.check_render("render-123", None).await, StatusReport::failed());
        assert_eq!(h.host.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn done_job_is_published_once() {
        let h = harness();
        h.renderer.report("done", Some("https://render/v.mp4"));
        for _ in 0..3 {
            let report = h.orchestrator.check_render("render-123", Some("Nova X")).await;
            assert_eq!(report, StatusReport::done("https://hosted/video.mp4".into()));
        }
        assert_eq!(h.host.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn publish_name_defaults_to_job_id() {
        let h = harness();
        h.renderer.report("done", Some("https://render/v.mp4"));
        h.orchestrator.check_render("render-123", Some("  ")).await;
        let identifier = h.host.last_identifier.lock().unwrap().clone().unwrap();
        assert!(identifier.starts_with("promo/render-123_"), "{identifier}");
    }

    #[tokio::test]
    async fn generate_survives_render_failure() {
        let h = harness_with(
            FakeImages::returning(Some(vec!["https://img/1.jpg".into()])),
            FakeText::new(|_| Ok(GOOD_REPLY.to_string())),
            FakeRenderer::new(None),
            FakeHost::new(None),
            OrchestratorSettings::default(),
        );
        let request = GenerationRequest::new("Nova X", vec!["Instagram".into()]).unwrap();
        let outcome = h.orchestrator.generate(&request).await;
        assert_eq!(outcome.images, vec!["https://img/1.jpg"]);
        assert_eq!(outcome.contents.len(), 1);
        assert!(!outcome.contents[0].is_error_marker());
        assert!(outcome.render_job.is_none());
    }

    #[test]
    fn maps_every_provider_state() {
        let url = || Some("https://cdn/v.mp4".to_string());
        assert_eq!(map_provider_status("submitted", None), RenderStatus::Submitted);
        assert_eq!(map_provider_status("queued", None), RenderStatus::Queued);
        for state in ["fetching", "rendering", "saving", "Rendering"] {
            assert_eq!(map_provider_status(state, None), RenderStatus::Rendering);
        }
        assert_eq!(
            map_provider_status("done", url()),
            RenderStatus::Done { url: "https://cdn/v.mp4".into() }
        );
        assert_eq!(map_provider_status("done", None), RenderStatus::Failed);
        assert_eq!(map_provider_status("failed", url()), RenderStatus::Failed);
        assert_eq!(map_provider_status("exploded", None), RenderStatus::Failed);
    }

    #[test]
    fn identifier_normalizes_whitespace() {
        assert_eq!(
            asset_identifier("promo", "  Nova \t X  Pro ", 1_700_000_000),
            "promo/Nova_X_Pro_1700000000"
        );
        assert_eq!(asset_identifier("/", "Nova X", 5), "Nova_X_5");
    }
}
