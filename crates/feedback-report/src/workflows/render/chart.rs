use super::{escape_xml, ChartRenderer, RenderError, RenderedArtifact};
use crate::workflows::feedback::report::DailyPoint;
use crate::workflows::feedback::SentimentLabel;
use std::fmt::Write;

const INDEX_COLOR: &str = "purple";
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_RIGHT: f64 = 70.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 50.0;

/// Stacked daily label counts with the satisfaction index drawn on a second axis.
#[derive(Debug, Clone, Copy)]
pub struct SvgDailyChart {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgDailyChart {
    fn default() -> Self {
        Self {
            width: 960,
            height: 480,
        }
    }
}

impl ChartRenderer for SvgDailyChart {
    fn render(&self, series: &[DailyPoint]) -> Result<RenderedArtifact, RenderError> {
        if series.is_empty() {
            return Err(RenderError::NothingToDraw);
        }

        let width = f64::from(self.width);
        let height = f64::from(self.height);
        let plot_width = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_height = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let baseline = MARGIN_TOP + plot_height;
        let tallest = series
            .iter()
            .map(|point| point.counts.total())
            .max()
            .unwrap_or(0)
            .max(1) as f64;
        let slot = plot_width / series.len() as f64;
        let bar_width = slot * 0.6;
        let index_y = |value: f64| MARGIN_TOP + (100.0 - value.clamp(-100.0, 100.0)) / 200.0 * plot_height;

        let mut svg = String::new();
        write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        )?;
        write!(
            svg,
            r#"<rect width="100%" height="100%" fill="white"/><text x="{x}" y="24" font-size="18" text-anchor="middle">{title}</text>"#,
            x = width / 2.0,
            title = escape_xml("Valoraciones y Satisfacción por Día")
        )?;

        for (position, label) in SentimentLabel::ordered().into_iter().enumerate() {
            let x = MARGIN_LEFT + position as f64 * 130.0;
            write!(
                svg,
                r#"<rect x="{x}" y="38" width="12" height="12" fill="{color}"/><text x="{tx}" y="49" font-size="12">{name}</text>"#,
                tx = x + 16.0,
                color = label.color(),
                name = escape_xml(label.label())
            )?;
        }

        write!(
            svg,
            r##"<line x1="{MARGIN_LEFT}" y1="{baseline}" x2="{x2}" y2="{baseline}" stroke="#444"/>"##,
            x2 = MARGIN_LEFT + plot_width
        )?;

        let mut index_points = Vec::with_capacity(series.len());
        for (position, point) in series.iter().enumerate() {
            let center = MARGIN_LEFT + slot * (position as f64 + 0.5);
            let mut top = baseline;
            for (label, count) in point.counts.ordered() {
                if count == 0 {
                    continue;
                }
                let bar_height = count as f64 / tallest * plot_height;
                top -= bar_height;
                write!(
                    svg,
                    r#"<rect x="{x:.1}" y="{top:.1}" width="{bar_width:.1}" height="{bar_height:.1}" fill="{color}"><title>{name}: {count}</title></rect>"#,
                    x = center - bar_width / 2.0,
                    color = label.color(),
                    name = escape_xml(label.label())
                )?;
            }
            write!(
                svg,
                r#"<text x="{center:.1}" y="{y:.1}" font-size="11" text-anchor="middle">{day}</text>"#,
                y = baseline + 18.0,
                day = point.date.format("%d-%m")
            )?;
            index_points.push((center, index_y(point.satisfaction), point.satisfaction));
        }

        let polyline: Vec<String> = index_points
            .iter()
            .map(|(x, y, _)| format!("{x:.1},{y:.1}"))
            .collect();
        write!(
            svg,
            r#"<polyline points="{}" fill="none" stroke="{INDEX_COLOR}" stroke-width="2"/>"#,
            polyline.join(" ")
        )?;
        for (x, y, value) in &index_points {
            write!(
                svg,
                r#"<circle cx="{x:.1}" cy="{y:.1}" r="4" fill="{INDEX_COLOR}"/><text x="{x:.1}" y="{ty:.1}" font-size="11" font-weight="bold" fill="{INDEX_COLOR}" text-anchor="middle">{value:.1}</text>"#,
                ty = y - 8.0
            )?;
        }

        for tick in [-100.0, 0.0, 100.0] {
            write!(
                svg,
                r#"<text x="{x:.1}" y="{y:.1}" font-size="11" fill="{INDEX_COLOR}">{tick:.0}</text>"#,
                x = MARGIN_LEFT + plot_width + 8.0,
                y = index_y(tick) + 4.0
            )?;
        }

        svg.push_str("</svg>");
        Ok(RenderedArtifact::svg(svg))
    }
}
