//! Render timeline handed to the video collaborator.
//!
//! The serialized shape follows the Shotstack edit API: a background colour,
//! a list of tracks, each a list of clips placed by absolute start time.

use serde::Serialize;

use crate::html::escape_html;

pub const CLIP_LENGTH_SECS: f64 = 2.0;
pub const TITLE_START_SECS: f64 = 0.5;
pub const TITLE_LENGTH_SECS: f64 = 3.0;
const BACKGROUND: &str = "#000000";
const IMAGE_EFFECT: &str = "zoomIn";
const TITLE_CSS: &str = "h1 { color: #ffffff; }";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Timeline {
    pub background: String,
    pub tracks: Vec<Track>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Track {
    pub clips: Vec<Clip>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Clip {
    pub asset: Asset,
    pub start: f64,
    pub length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Asset {
    Image { src: String },
    Html { html: String, css: String },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutputSpec {
    pub format: String,
    pub resolution: String,
}

impl Default for OutputSpec {
    fn default() -> Self {
        Self {
            format: "mp4".to_string(),
            resolution: "sd".to_string(),
        }
    }
}

impl Timeline {
    /// Slideshow of `images` with the product name as a title overlay.
    ///
    /// Image clips are back to back: clip `i` starts at `i * CLIP_LENGTH_SECS`.
    pub fn slideshow(product_name: &str, images: &[String]) -> Self {
        let clips = images
            .iter()
            .enumerate()
            .map(|(index, src)| Clip {
                asset: Asset::Image { src: src.clone() },
                start: index as f64 * CLIP_LENGTH_SECS,
                length: CLIP_LENGTH_SECS,
                effect: Some(IMAGE_EFFECT.to_string()),
            })
            .collect();
        let title = Clip {
            asset: Asset::Html {
                html: format!("<h1>{}</h1>", escape_html(product_name)),
                css: TITLE_CSS.to_string(),
            },
            start: TITLE_START_SECS,
            length: TITLE_LENGTH_SECS,
            effect: None,
        };
        Self {
            background: BACKGROUND.to_string(),
            tracks: vec![Track { clips }, Track { clips: vec![title] }],
        }
    }

    /// End of the last image clip.
    pub fn duration(&self) -> f64 {
        self.tracks
            .first()
            .and_then(|track| track.clips.last())
            .map(|clip| clip.start + clip.length)
            .unwrap_or(0.0)
    }
}
