//! Resolves one canonical sentiment label per record.
//!
//! The text classifier is an injected collaborator. When it is absent, fails,
//! or the record has no comment, the categorical rating column is used as-is.

mod http;

pub use http::HttpClassifier;

use super::config::MissingLabelPolicy;
use super::domain::{FeedbackRecord, SentimentLabel, SentimentScale};
use crate::config::ClassifierConfig;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

pub const CLASSIFIER_FAILURES_METRIC: &str = "feedback_classifier_failures_total";

/// Coarse output vocabulary of the text classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierLabel {
    Positive,
    Neutral,
    Negative,
}

impl ClassifierLabel {
    /// Maps a raw model label. Anything outside the known vocabulary reads as neutral.
    pub fn from_model(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "POS" | "POSITIVE" | "LABEL_2" => Self::Positive,
            "NEG" | "NEGATIVE" | "LABEL_0" => Self::Negative,
            _ => Self::Neutral,
        }
    }

    /// The classifier only speaks to the extremes of the five-level scale.
    pub const fn canonical(self) -> SentimentLabel {
        match self {
            Self::Positive => SentimentLabel::VeryPositive,
            Self::Neutral => SentimentLabel::Neutral,
            Self::Negative => SentimentLabel::VeryNegative,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: ClassifierLabel,
    pub confidence: f32,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Request(String),
    #[error("classifier returned an unexpected payload: {0}")]
    InvalidResponse(String),
    #[error("classifier returned {got} predictions for {expected} inputs")]
    BatchMismatch { expected: usize, got: usize },
}

/// Text in, coarse label out.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError>;

    fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Classification>, ClassifierError> {
        texts.iter().map(|text| self.classify(text)).collect()
    }
}

/// Whether a classifier is wired in for this run.
#[derive(Clone, Default)]
pub enum ClassifierBackend {
    #[default]
    Unavailable,
    Available(Arc<dyn SentimentClassifier>),
}

impl ClassifierBackend {
    pub fn from_config(config: &ClassifierConfig) -> Self {
        match config.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => {
                let classifier = HttpClassifier::new(endpoint, config.token.clone(), config.timeout);
                Self::Available(Arc::new(classifier))
            }
            _ => Self::Unavailable,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

impl std::fmt::Debug for ClassifierBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => f.write_str("Unavailable"),
            Self::Available(_) => f.write_str("Available(..)"),
        }
    }
}

/// Where a resolved label came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    Classifier,
    Rating,
    DefaultNeutral,
    Unlabeled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub label: Option<SentimentLabel>,
    pub source: LabelSource,
}

/// How a run's labels were obtained.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionStats {
    #[serde(rename = "clasificados")]
    pub classified: usize,
    #[serde(rename = "desde_calificacion")]
    pub from_rating: usize,
    #[serde(rename = "neutral_por_defecto")]
    pub defaulted_neutral: usize,
    #[serde(rename = "sin_etiqueta")]
    pub unlabeled: usize,
    #[serde(rename = "fallas_clasificador")]
    pub classifier_failures: usize,
}

impl ResolutionStats {
    fn record(&mut self, source: LabelSource) {
        match source {
            LabelSource::Classifier => self.classified += 1,
            LabelSource::Rating => self.from_rating += 1,
            LabelSource::DefaultNeutral => self.defaulted_neutral += 1,
            LabelSource::Unlabeled => self.unlabeled += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentResolver {
    backend: ClassifierBackend,
    max_chars: usize,
    batch_size: usize,
    missing_label: MissingLabelPolicy,
}

impl SentimentResolver {
    pub fn new(
        backend: ClassifierBackend,
        max_chars: usize,
        batch_size: usize,
        missing_label: MissingLabelPolicy,
    ) -> Self {
        Self {
            backend,
            max_chars: max_chars.max(1),
            batch_size: batch_size.max(1),
            missing_label,
        }
    }

    pub fn fallback_only(missing_label: MissingLabelPolicy) -> Self {
        let defaults = ClassifierConfig::default();
        Self::new(
            ClassifierBackend::Unavailable,
            defaults.max_chars,
            defaults.batch_size,
            missing_label,
        )
    }

    /// Five levels when a classifier ran or any record resolved to `Neutral`
    /// (a `Neutral` rating or the missing-label default); four otherwise.
    pub fn scale_for(&self, resolutions: &[Resolution]) -> SentimentScale {
        let neutral_votes = resolutions
            .iter()
            .any(|resolution| resolution.label == Some(SentimentLabel::Neutral));
        if self.backend.is_available() || neutral_votes {
            SentimentScale::FiveLevel
        } else {
            SentimentScale::FourLevel
        }
    }

    pub fn missing_label(&self) -> MissingLabelPolicy {
        self.missing_label
    }

    /// Resolves every record, batching classifier calls. Output order matches input order.
    pub fn resolve_all(&self, records: &[FeedbackRecord]) -> (Vec<Resolution>, ResolutionStats) {
        let mut stats = ResolutionStats::default();
        let mut resolved: Vec<Option<Resolution>> = vec![None; records.len()];

        if let ClassifierBackend::Available(classifier) = &self.backend {
            let pending: Vec<(usize, &str)> = records
                .iter()
                .enumerate()
                .filter_map(|(index, record)| {
                    record
                        .comment_text()
                        .map(|text| (index, truncate_chars(text, self.max_chars)))
                })
                .collect();

            for chunk in pending.chunks(self.batch_size) {
                let texts: Vec<&str> = chunk.iter().map(|(_, text)| *text).collect();
                let outcome = classifier.classify_batch(&texts).and_then(|labels| {
                    if labels.len() == texts.len() {
                        Ok(labels)
                    } else {
                        Err(ClassifierError::BatchMismatch {
                            expected: texts.len(),
                            got: labels.len(),
                        })
                    }
                });

                match outcome {
                    Ok(labels) => {
                        for ((index, _), classification) in chunk.iter().zip(labels) {
                            resolved[*index] = Some(classified(classification));
                        }
                    }
                    Err(err) => {
                        warn!(
                            error = %err,
                            records = chunk.len(),
                            "sentiment classifier batch failed; using ratings"
                        );
                        metrics::counter!(CLASSIFIER_FAILURES_METRIC).increment(chunk.len() as u64);
                        stats.classifier_failures += chunk.len();
                    }
                }
            }
        }

        let resolutions: Vec<Resolution> = records
            .iter()
            .zip(resolved)
            .map(|(record, resolution)| resolution.unwrap_or_else(|| self.fallback(record)))
            .collect();

        for resolution in &resolutions {
            stats.record(resolution.source);
        }
        debug!(?stats, scale = self.scale_for(&resolutions).label(), "sentiment resolved");

        (resolutions, stats)
    }

    fn fallback(&self, record: &FeedbackRecord) -> Resolution {
        match (record.rating, self.missing_label) {
            (Some(label), _) => Resolution {
                label: Some(label),
                source: LabelSource::Rating,
            },
            (None, MissingLabelPolicy::Neutral) => Resolution {
                label: Some(SentimentLabel::Neutral),
                source: LabelSource::DefaultNeutral,
            },
            (None, MissingLabelPolicy::Exclude) => Resolution {
                label: None,
                source: LabelSource::Unlabeled,
            },
        }
    }
}

fn classified(classification: Classification) -> Resolution {
    Resolution {
        label: Some(classification.label.canonical()),
        source: LabelSource::Classifier,
    }
}

/// Cuts `text` to at most `max_chars` characters on a char boundary.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}
