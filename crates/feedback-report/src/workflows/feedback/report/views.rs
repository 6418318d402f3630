use super::super::config::{MissingLabelPolicy, SatisfactionFormula};
use super::super::domain::{AreaGroup, SentimentScale};
use super::super::scoring::SentimentCounts;
use super::super::sentiment::ResolutionStats;
use super::super::themes::Theme;
use crate::workflows::render::RenderedArtifact;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Immutable result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    #[serde(rename = "informe_periodo")]
    pub period: String,
    #[serde(rename = "analisis_general")]
    pub overview: GeneralAnalysis,
    /// Groups by descending volume; equal volumes keep canonical order.
    #[serde(rename = "resumen_por_grupos")]
    pub group_summaries: Vec<GroupSummary>,
    #[serde(rename = "analisis_ia_resumen")]
    pub narrative: String,
    /// Groups in canonical order, segments by descending volume.
    #[serde(rename = "analisis_detallado_ordenado")]
    pub detailed: Vec<GroupDetail>,
    #[serde(rename = "oportunidades_globales", default)]
    pub global_opportunities: Vec<Theme>,
    #[serde(rename = "destacados_globales", default)]
    pub global_highlights: Vec<Theme>,
    #[serde(rename = "serie_diaria", default)]
    pub daily_series: Vec<DailyPoint>,
    #[serde(rename = "perfil_horario", default)]
    pub hourly_profile: Vec<HourlyBucket>,
    #[serde(rename = "metodologia")]
    pub methodology: Methodology,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralAnalysis {
    #[serde(rename = "total_valoraciones")]
    pub total_ratings: usize,
    #[serde(rename = "total_comentarios")]
    pub total_comments: usize,
    #[serde(rename = "satisfaccion_general")]
    pub satisfaction: f64,
    #[serde(rename = "grafico_diario", default)]
    pub daily_chart: Option<RenderedArtifact>,
    #[serde(rename = "nube_palabras_negativa", default)]
    pub negative_cloud: Option<RenderedArtifact>,
    #[serde(rename = "nube_palabras_positiva", default)]
    pub positive_cloud: Option<RenderedArtifact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    #[serde(rename = "sector")]
    pub group: AreaGroup,
    #[serde(rename = "cantidad_valoraciones")]
    pub ratings: usize,
    #[serde(rename = "satisfaccion")]
    pub satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDetail {
    #[serde(rename = "grupo_titulo")]
    pub group: AreaGroup,
    #[serde(rename = "detalles_sector")]
    pub segments: Vec<SegmentDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDetail {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "total_valoraciones")]
    pub total_ratings: usize,
    #[serde(rename = "total_comentarios")]
    pub total_comments: usize,
    #[serde(rename = "satisfaccion")]
    pub satisfaction: f64,
    #[serde(rename = "oportunidades_mejora", default)]
    pub opportunities: Vec<Theme>,
    #[serde(rename = "puntos_destacados", default)]
    pub highlights: Vec<Theme>,
}

/// One calendar day of the chart series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    #[serde(rename = "fecha")]
    pub date: NaiveDate,
    #[serde(rename = "total_valoraciones")]
    pub total_ratings: usize,
    #[serde(rename = "conteos")]
    pub counts: SentimentCounts,
    #[serde(rename = "satisfaccion")]
    pub satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyBucket {
    #[serde(rename = "hora")]
    pub hour: u32,
    #[serde(rename = "total_valoraciones")]
    pub total_ratings: usize,
    #[serde(rename = "conteos")]
    pub counts: SentimentCounts,
    #[serde(rename = "satisfaccion")]
    pub satisfaction: f64,
}

/// How the numbers in a report were produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Methodology {
    #[serde(rename = "formula")]
    pub formula: SatisfactionFormula,
    #[serde(rename = "escala")]
    pub scale: SentimentScale,
    #[serde(rename = "etiqueta_faltante")]
    pub missing_label: MissingLabelPolicy,
    #[serde(rename = "resolucion")]
    pub resolution: ResolutionStats,
    #[serde(rename = "filas_descartadas")]
    pub dropped_rows: usize,
}
