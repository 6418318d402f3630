use super::config::AnalysisConfig;
use super::domain::{ClassifiedRecord, FeedbackRecord, SentimentLabel};
use super::report::{FeedbackReport, Methodology, ReportAssembler, ReportError};
use super::segmentation::{classify_group, segment_title};
use super::sentiment::{ClassifierBackend, SentimentResolver};
use crate::config::AppConfig;
use crate::workflows::intake::{FeedbackImporter, ImportError, ImportedTable};
use crate::workflows::render::{
    RenderError, RenderedArtifact, RenderedDocument, Renderers, RENDER_FAILURES_METRIC,
};
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// One configured analysis: import, resolve, segment, score, aggregate, render.
#[derive(Debug, Clone)]
pub struct FeedbackPipeline {
    config: AnalysisConfig,
    resolver: SentimentResolver,
    renderers: Renderers,
}

impl FeedbackPipeline {
    pub fn new(config: AnalysisConfig, resolver: SentimentResolver, renderers: Renderers) -> Self {
        Self {
            config,
            resolver,
            renderers,
        }
    }

    /// Fallback-only resolver and built-in renderers.
    pub fn offline(config: AnalysisConfig) -> Self {
        let resolver = SentimentResolver::fallback_only(config.missing_label);
        Self::new(config, resolver, Renderers::builtin())
    }

    pub fn from_app_config(app: &AppConfig) -> Self {
        let backend = ClassifierBackend::from_config(&app.classifier);
        let resolver = SentimentResolver::new(
            backend,
            app.classifier.max_chars,
            app.classifier.batch_size,
            app.analysis.missing_label,
        );
        Self::new(app.analysis.clone(), resolver, Renderers::builtin())
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze_path<P: AsRef<Path>>(&self, path: P) -> Result<FeedbackReport, AnalysisError> {
        let table = FeedbackImporter::from_path(path)?;
        Ok(self.analyze(table)?)
    }

    pub fn analyze_reader<R: Read>(&self, reader: R) -> Result<FeedbackReport, AnalysisError> {
        let table = FeedbackImporter::from_reader(reader)?;
        Ok(self.analyze(table)?)
    }

    /// Builds the report for an imported table. Blocks while the classifier runs.
    pub fn analyze(&self, table: ImportedTable) -> Result<FeedbackReport, ReportError> {
        let ImportedTable {
            records,
            dropped_rows,
        } = table;
        if records.is_empty() {
            return Err(ReportError::NoUsableData { dropped_rows });
        }

        let (resolutions, resolution) = self.resolver.resolve_all(&records);
        let scale = self.resolver.scale_for(&resolutions);
        if resolution.classifier_failures > 0 {
            warn!(
                failures = resolution.classifier_failures,
                records = records.len(),
                "sentiment classifier fell back to ratings"
            );
        }

        let classified: Vec<ClassifiedRecord> = records
            .into_iter()
            .zip(resolutions)
            .map(|(record, resolved)| self.classify(record, resolved.label))
            .collect();

        let methodology = Methodology {
            formula: self.config.formula,
            scale,
            missing_label: self.config.missing_label,
            resolution,
            dropped_rows,
        };
        let mut report = ReportAssembler::new(&self.config).assemble(&classified, methodology)?;

        report.overview.daily_chart =
            degrade("daily_chart", self.renderers.chart.render(&report.daily_series));
        report.overview.negative_cloud = self.word_cloud(
            "negative_cloud",
            &comment_blob(&classified, SentimentLabel::is_negative),
            SentimentLabel::VeryNegative.color(),
        );
        report.overview.positive_cloud = self.word_cloud(
            "positive_cloud",
            &comment_blob(&classified, SentimentLabel::is_positive),
            SentimentLabel::VeryPositive.color(),
        );

        info!(
            period = %report.period,
            records = report.overview.total_ratings,
            dropped = dropped_rows,
            satisfaction = report.overview.satisfaction,
            formula = self.config.formula.label(),
            scale = report.methodology.scale.label(),
            "feedback report assembled"
        );
        Ok(report)
    }

    pub fn render_document(&self, report: &FeedbackReport) -> Result<RenderedDocument, RenderError> {
        self.renderers.document.render(report).map_err(|err| {
            warn!(error = %err, "document render failed");
            metrics::counter!(RENDER_FAILURES_METRIC).increment(1);
            err
        })
    }

    fn classify(&self, record: FeedbackRecord, sentiment: Option<SentimentLabel>) -> ClassifiedRecord {
        let group = classify_group(&record.area, &record.room, &self.config.vip_marker);
        let segment = segment_title(&record, self.config.segment_key);
        ClassifiedRecord {
            record,
            sentiment,
            group,
            segment,
        }
    }

    fn word_cloud(&self, artifact: &'static str, text: &str, color: &str) -> Option<RenderedArtifact> {
        if text.trim().is_empty() {
            return None;
        }
        degrade(artifact, self.renderers.word_cloud.render(text, color))
    }
}

/// A failed artifact becomes `None`; an empty input is not a failure.
fn degrade(
    artifact: &'static str,
    outcome: Result<RenderedArtifact, RenderError>,
) -> Option<RenderedArtifact> {
    match outcome {
        Ok(rendered) => Some(rendered),
        Err(RenderError::NothingToDraw) => {
            debug!(artifact, "nothing to draw");
            None
        }
        Err(err) => {
            warn!(artifact, error = %err, "render failed; artifact omitted");
            metrics::counter!(RENDER_FAILURES_METRIC).increment(1);
            None
        }
    }
}

fn comment_blob(records: &[ClassifiedRecord], band: fn(SentimentLabel) -> bool) -> String {
    records
        .iter()
        .filter(|entry| entry.sentiment.is_some_and(band))
        .filter_map(|entry| entry.record.comment_text())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::feedback::domain::AreaGroup;
    use crate::workflows::feedback::report::DailyPoint;
    use crate::workflows::render::ChartRenderer;
    use std::io::Cursor;
    use std::sync::Arc;

    struct BrokenChart;

    impl ChartRenderer for BrokenChart {
        fn render(&self, _series: &[DailyPoint]) -> Result<RenderedArtifact, RenderError> {
            Err(RenderError::Format(std::fmt::Error))
        }
    }

    const EXPORT: &str = "\
fecha,comentarios,calificacion_descripcion,puntos_criticos,destacados,sala,sector
2025-03-01,la fila no avanza,Negativa,Espera,,Sala 1,Cajas
2025-03-01,,Positiva,,,Sala VIP,Baño VIP
2025-03-02,excelente atención,Muy Positiva,,Atención,Sala 2,Atención al Cliente
";

    #[test]
    fn groups_records_and_renders_artifacts() {
        let pipeline = FeedbackPipeline::offline(AnalysisConfig::default());
        let report = pipeline
            .analyze_reader(Cursor::new(EXPORT))
            .expect("analysis succeeds");

        let groups: Vec<AreaGroup> = report.group_summaries.iter().map(|g| g.group).collect();
        assert_eq!(
            groups,
            vec![AreaGroup::CustomerService, AreaGroup::Cashiers, AreaGroup::Vip]
        );
        assert!(report.overview.daily_chart.is_some());
        assert!(report.overview.negative_cloud.is_some());
        assert!(report.overview.positive_cloud.is_some());
        assert_eq!(report.methodology.resolution.from_rating, 3);
    }

    #[test]
    fn render_failure_degrades_to_missing_artifact() {
        let builtin = Renderers::builtin();
        let renderers = Renderers {
            chart: Arc::new(BrokenChart),
            word_cloud: builtin.word_cloud.clone(),
            document: builtin.document.clone(),
        };
        let config = AnalysisConfig::default();
        let pipeline = FeedbackPipeline::new(
            config.clone(),
            SentimentResolver::fallback_only(config.missing_label),
            renderers,
        );

        let report = pipeline
            .analyze_reader(Cursor::new(EXPORT))
            .expect("analysis still succeeds");
        assert!(report.overview.daily_chart.is_none());
        assert!(report.overview.negative_cloud.is_some());
    }

    #[test]
    fn header_only_export_has_no_usable_data() {
        let pipeline = FeedbackPipeline::offline(AnalysisConfig::default());
        let export = "fecha,comentarios,calificacion_descripcion,puntos_criticos,destacados,sala,sector\n\
                      ayer,hola,Positiva,,,Sala 1,Cajas\n";
        let err = pipeline
            .analyze_reader(Cursor::new(export))
            .expect_err("no usable rows");
        assert!(matches!(
            err,
            AnalysisError::Report(ReportError::NoUsableData { dropped_rows: 1 })
        ));
    }

    #[test]
    fn document_renders_through_the_injected_renderer() {
        let pipeline = FeedbackPipeline::offline(AnalysisConfig::default());
        let report = pipeline
            .analyze_reader(Cursor::new(EXPORT))
            .expect("analysis succeeds");
        let document = pipeline.render_document(&report).expect("document renders");
        assert!(String::from_utf8_lossy(&document.bytes).contains("Grupo: VIP"));
    }
}
