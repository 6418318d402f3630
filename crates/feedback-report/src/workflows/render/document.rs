use super::{DocumentRenderer, RenderError, RenderedArtifact, RenderedDocument};
use base64::{engine::general_purpose::STANDARD, Engine};
use crate::workflows::feedback::report::{FeedbackReport, SegmentDetail};
use crate::workflows::feedback::themes::Theme;
use std::fmt::Write;

const THEMES_PER_LIST: usize = 2;

/// The report as a Markdown document with six numbered sections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownDocument;

impl DocumentRenderer for MarkdownDocument {
    fn render(&self, report: &FeedbackReport) -> Result<RenderedDocument, RenderError> {
        let overview = &report.overview;
        let mut doc = String::new();

        writeln!(doc, "# Panel de Análisis de Experiencia del Cliente\n")?;
        writeln!(doc, "## Informe de Satisfacción ({})\n", report.period)?;

        writeln!(doc, "### 1. Resumen General\n")?;
        writeln!(doc, "| Índice de Satisfacción | Total Valoraciones | Total Comentarios |")?;
        writeln!(doc, "|---|---|---|")?;
        writeln!(
            doc,
            "| {} | {} | {} |\n",
            overview.satisfaction, overview.total_ratings, overview.total_comments
        )?;

        writeln!(doc, "### 2. Temas Clave en Comentarios\n")?;
        embed(&mut doc, "Oportunidades de Mejora", overview.negative_cloud.as_ref())?;
        embed(&mut doc, "Temas Positivos", overview.positive_cloud.as_ref())?;

        writeln!(doc, "### 3. Evolución Diaria de Valoraciones\n")?;
        if let Some(chart) = &overview.daily_chart {
            writeln!(doc, "![Evolución diaria]({})\n", data_uri(chart))?;
        }
        if report.daily_series.is_empty() {
            writeln!(doc, "_Sin datos diarios._\n")?;
        } else {
            writeln!(doc, "| Fecha | Valoraciones | Índice |")?;
            writeln!(doc, "|---|---|---|")?;
            for point in &report.daily_series {
                writeln!(
                    doc,
                    "| {} | {} | {} |",
                    point.date.format("%d/%m/%Y"),
                    point.total_ratings,
                    point.satisfaction
                )?;
            }
            writeln!(doc)?;
        }

        writeln!(doc, "### 4. Resumen por Grupos Principales\n")?;
        writeln!(doc, "| Grupo | # Valoraciones | Índice Satisfacción |")?;
        writeln!(doc, "|---|---|---|")?;
        for summary in &report.group_summaries {
            writeln!(
                doc,
                "| {} | {} | {} |",
                summary.group.label(),
                summary.ratings,
                summary.satisfaction
            )?;
        }
        writeln!(doc)?;

        writeln!(doc, "### 5. Conclusiones del Análisis (IA)\n")?;
        writeln!(doc, "{}\n", report.narrative)?;

        writeln!(doc, "### 6. Análisis Detallado por Sector\n")?;
        for group in &report.detailed {
            writeln!(doc, "#### Grupo: {}\n", group.group.label())?;
            for segment in &group.segments {
                write_segment(&mut doc, segment)?;
            }
        }

        Ok(RenderedDocument {
            media_type: "text/markdown; charset=utf-8",
            file_name: "reporte_satisfaccion.md".to_string(),
            bytes: doc.into_bytes(),
        })
    }
}

/// Inline image, or a placeholder line when the artifact was not produced.
fn embed(doc: &mut String, title: &str, artifact: Option<&RenderedArtifact>) -> std::fmt::Result {
    writeln!(doc, "**{title}**\n")?;
    match artifact {
        Some(artifact) => writeln!(doc, "![{title}]({})\n", data_uri(artifact)),
        None => writeln!(doc, "_Sin datos._\n"),
    }
}

fn data_uri(artifact: &RenderedArtifact) -> String {
    format!(
        "data:{};base64,{}",
        artifact.media_type,
        STANDARD.encode(artifact.body.as_bytes())
    )
}

fn write_segment(doc: &mut String, segment: &SegmentDetail) -> std::fmt::Result {
    writeln!(doc, "**{}**\n", segment.title)?;
    writeln!(
        doc,
        "Satisfacción: {} | Valoraciones: {} | Comentarios: {}\n",
        segment.satisfaction, segment.total_ratings, segment.total_comments
    )?;
    write_themes(doc, "Oportunidades de Mejora", &segment.opportunities)?;
    write_themes(doc, "Puntos Destacados", &segment.highlights)
}

fn write_themes(doc: &mut String, heading: &str, themes: &[Theme]) -> std::fmt::Result {
    if themes.is_empty() {
        return Ok(());
    }
    writeln!(doc, "_{heading}:_\n")?;
    for theme in themes.iter().take(THEMES_PER_LIST) {
        write!(doc, "- {} ({} menciones)", theme.tag, theme.count)?;
        if let Some(example) = theme.examples.first() {
            write!(doc, " ...\"{example}\"")?;
        }
        writeln!(doc)?;
    }
    writeln!(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::feedback::{MissingLabelPolicy, SatisfactionFormula};
    use crate::workflows::feedback::domain::{AreaGroup, SentimentScale};
    use crate::workflows::feedback::report::{
        GeneralAnalysis, GroupDetail, GroupSummary, Methodology,
    };
    use crate::workflows::feedback::sentiment::ResolutionStats;

    fn theme(tag: &str, count: usize, example: Option<&str>) -> Theme {
        Theme {
            tag: tag.to_string(),
            count,
            examples: example.map(str::to_string).into_iter().collect(),
        }
    }

    fn report() -> FeedbackReport {
        FeedbackReport {
            period: "Del 01/03/2025 al 02/03/2025".to_string(),
            overview: GeneralAnalysis {
                total_ratings: 4,
                total_comments: 2,
                satisfaction: -25.0,
                daily_chart: None,
                negative_cloud: None,
                positive_cloud: None,
            },
            group_summaries: vec![GroupSummary {
                group: AreaGroup::CustomerService,
                ratings: 4,
                satisfaction: -25.0,
            }],
            narrative: "No se encontraron temas positivos recurrentes.".to_string(),
            detailed: vec![GroupDetail {
                group: AreaGroup::CustomerService,
                segments: vec![SegmentDetail {
                    title: "Mostrador".to_string(),
                    total_ratings: 4,
                    total_comments: 2,
                    satisfaction: -25.0,
                    opportunities: vec![
                        theme("Espera", 3, Some("muy lento")),
                        theme("Trato", 2, None),
                        theme("Precio", 1, Some("caro")),
                    ],
                    highlights: Vec::new(),
                }],
            }],
            global_opportunities: Vec::new(),
            global_highlights: Vec::new(),
            daily_series: Vec::new(),
            hourly_profile: Vec::new(),
            methodology: Methodology {
                formula: SatisfactionFormula::NetPromoter,
                scale: SentimentScale::FourLevel,
                missing_label: MissingLabelPolicy::Neutral,
                resolution: ResolutionStats::default(),
                dropped_rows: 0,
            },
        }
    }

    #[test]
    fn renders_all_sections_and_caps_theme_lists() {
        let document = MarkdownDocument.render(&report()).expect("document renders");
        let text = String::from_utf8(document.bytes).expect("utf-8");

        for heading in [
            "### 1. Resumen General",
            "### 2. Temas Clave en Comentarios",
            "### 3. Evolución Diaria de Valoraciones",
            "### 4. Resumen por Grupos Principales",
            "### 5. Conclusiones del Análisis (IA)",
            "### 6. Análisis Detallado por Sector",
        ] {
            assert!(text.contains(heading), "missing {heading}");
        }
        assert!(text.contains("| Atención al Cliente | 4 | -25 |"));
        assert!(text.contains("- Espera (3 menciones) ...\"muy lento\""));
        assert!(text.contains("- Trato (2 menciones)\n"));
        assert!(!text.contains("Precio"));
        assert_eq!(document.file_name, "reporte_satisfaccion.md");
        assert!(!text.contains("data:image"));
        assert!(text.contains("_Sin datos._"));
    }

    #[test]
    fn embeds_chart_and_word_clouds_as_data_uris() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>".to_string();
        let mut report = report();
        report.overview.daily_chart = Some(RenderedArtifact::svg(svg.clone()));
        report.overview.negative_cloud = Some(RenderedArtifact::svg(svg.clone()));
        report.overview.positive_cloud = None;

        let document = MarkdownDocument.render(&report).expect("document renders");
        let text = String::from_utf8(document.bytes).expect("utf-8");

        let encoded = format!("data:image/svg+xml;base64,{}", STANDARD.encode(svg.as_bytes()));
        assert_eq!(text.matches(&encoded).count(), 2);
        assert!(text.contains(&format!("![Evolución diaria]({encoded})")));
        assert!(text.contains(&format!("![Oportunidades de Mejora]({encoded})")));
        let positive = text
            .split("**Temas Positivos**")
            .nth(1)
            .expect("positive section present");
        assert!(positive.trim_start().starts_with("_Sin datos._"));
    }
}
