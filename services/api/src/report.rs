use clap::Args;
use feedback_report::config::AppConfig;
use feedback_report::error::AppError;
use feedback_report::workflows::feedback::{FeedbackPipeline, FeedbackReport};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// CSV export to analyse
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Print the full report as JSON instead of the summary
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let ReportArgs { input, json } = args;
    let config = AppConfig::load()?;
    let pipeline = FeedbackPipeline::from_app_config(&config);

    let report = tokio::task::spawn_blocking(move || pipeline.analyze_path(input)).await??;

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(body) => println!("{body}"),
            Err(err) => println!("Report payload unavailable: {err}"),
        }
    } else {
        for line in summary_lines(&report) {
            println!("{line}");
        }
    }
    Ok(())
}

pub(crate) fn summary_lines(report: &FeedbackReport) -> Vec<String> {
    let overview = &report.overview;
    let methodology = &report.methodology;
    let mut lines = vec![
        format!("Informe de satisfacción ({})", report.period),
        format!(
            "Índice {} | {} valoraciones | {} comentarios",
            overview.satisfaction, overview.total_ratings, overview.total_comments
        ),
        format!(
            "Fórmula {} | escala {} | {} filas descartadas",
            methodology.formula.label(),
            methodology.scale.label(),
            methodology.dropped_rows
        ),
    ];

    let resolution = &methodology.resolution;
    if resolution.classifier_failures > 0 {
        lines.push(format!(
            "Clasificador no disponible para {} registros; se usaron las calificaciones",
            resolution.classifier_failures
        ));
    }

    lines.push(String::new());
    lines.push("Resumen por grupos".to_string());
    for summary in &report.group_summaries {
        lines.push(format!(
            "- {}: {} valoraciones | índice {}",
            summary.group.label(),
            summary.ratings,
            summary.satisfaction
        ));
    }

    lines.push(String::new());
    lines.push(report.narrative.clone());

    for group in &report.detailed {
        lines.push(String::new());
        lines.push(format!("Grupo: {}", group.group.label()));
        for segment in &group.segments {
            lines.push(format!(
                "- {} | {} valoraciones | índice {}",
                segment.title, segment.total_ratings, segment.satisfaction
            ));
            if let Some(theme) = segment.opportunities.first() {
                lines.push(format!("  mejora: {} ({})", theme.tag, theme.count));
            }
            if let Some(theme) = segment.highlights.first() {
                lines.push(format!("  destacado: {} ({})", theme.tag, theme.count));
            }
        }
    }
    lines
}
