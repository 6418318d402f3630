//! Rendering collaborators: daily chart, word clouds and the downloadable document.
//!
//! A renderer failure costs one artifact, never the report.

mod chart;
mod document;
mod wordcloud;

pub use chart::SvgDailyChart;
pub use document::MarkdownDocument;
pub use wordcloud::{word_frequencies, SvgWordCloud, WordFrequency};

use crate::workflows::feedback::report::{DailyPoint, FeedbackReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

pub const RENDER_FAILURES_METRIC: &str = "feedback_render_failures_total";

/// An embeddable image, carried inline in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedArtifact {
    pub media_type: String,
    pub body: String,
}

impl RenderedArtifact {
    pub fn svg(body: String) -> Self {
        Self {
            media_type: "image/svg+xml".to_string(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub media_type: &'static str,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("nothing to draw")]
    NothingToDraw,
    #[error("failed to write rendered output: {0}")]
    Format(#[from] std::fmt::Error),
}

pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &[DailyPoint]) -> Result<RenderedArtifact, RenderError>;
}

pub trait WordCloudRenderer: Send + Sync {
    fn render(&self, text: &str, color: &str) -> Result<RenderedArtifact, RenderError>;
}

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, report: &FeedbackReport) -> Result<RenderedDocument, RenderError>;
}

#[derive(Clone)]
pub struct Renderers {
    pub chart: Arc<dyn ChartRenderer>,
    pub word_cloud: Arc<dyn WordCloudRenderer>,
    pub document: Arc<dyn DocumentRenderer>,
}

impl Renderers {
    pub fn builtin() -> Self {
        Self {
            chart: Arc::new(SvgDailyChart::default()),
            word_cloud: Arc::new(SvgWordCloud::default()),
            document: Arc::new(MarkdownDocument),
        }
    }
}

impl Default for Renderers {
    fn default() -> Self {
        Self::builtin()
    }
}

impl std::fmt::Debug for Renderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderers").finish_non_exhaustive()
    }
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
