use super::super::config::{AnalysisConfig, SatisfactionFormula};
use super::super::domain::{AreaGroup, ClassifiedRecord, ThemeKind};
use super::super::scoring::SentimentCounts;
use super::super::themes::{merge_themes, Theme, ThemeAggregator};
use super::insights::{narrative, period_label};
use super::series::{daily_series, hourly_profile};
use super::views::{
    FeedbackReport, GeneralAnalysis, GroupDetail, GroupSummary, Methodology, SegmentDetail,
};
use super::ReportError;
use std::collections::HashMap;

/// Composes scores, segments and themes into a report. Pure: no I/O, no rendering.
pub struct ReportAssembler<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> ReportAssembler<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn assemble(
        &self,
        records: &[ClassifiedRecord],
        methodology: Methodology,
    ) -> Result<FeedbackReport, ReportError> {
        let Some(period) = period_label(records.iter().map(|entry| entry.record.timestamp)) else {
            return Err(ReportError::NoUsableData {
                dropped_rows: methodology.dropped_rows,
            });
        };

        let formula = self.config.formula;
        let themes = ThemeAggregator::new(&self.config.theme_sentinel, self.config.example_limit);
        let everyone: Vec<&ClassifiedRecord> = records.iter().collect();

        let mut group_summaries = Vec::new();
        let mut detailed = Vec::new();

        for group in AreaGroup::ordered() {
            let members: Vec<&ClassifiedRecord> =
                records.iter().filter(|entry| entry.group == group).collect();
            if members.is_empty() {
                continue;
            }

            group_summaries.push(GroupSummary {
                group,
                ratings: members.len(),
                satisfaction: score(formula, &members),
            });

            let mut segments: Vec<SegmentDetail> = partition_by_segment(&members)
                .into_iter()
                .map(|(title, entries)| segment_detail(title, &entries, formula, &themes))
                .collect();
            segments.sort_by(|a, b| {
                b.total_ratings
                    .cmp(&a.total_ratings)
                    .then_with(|| a.title.cmp(&b.title))
            });

            detailed.push(GroupDetail { group, segments });
        }

        // stable: equal volumes keep canonical order
        group_summaries.sort_by(|a, b| b.ratings.cmp(&a.ratings));

        let segments = || detailed.iter().flat_map(|group| group.segments.iter());
        let global_opportunities = merge_themes(segments().map(|s| s.opportunities.as_slice()));
        let global_highlights = merge_themes(segments().map(|s| s.highlights.as_slice()));

        Ok(FeedbackReport {
            period,
            overview: GeneralAnalysis {
                total_ratings: records.len(),
                total_comments: count_comments(&everyone),
                satisfaction: score(formula, &everyone),
                daily_chart: None,
                negative_cloud: None,
                positive_cloud: None,
            },
            group_summaries,
            narrative: narrative(&global_opportunities, &global_highlights),
            detailed,
            global_opportunities,
            global_highlights,
            daily_series: daily_series(records, formula),
            hourly_profile: hourly_profile(records, formula),
            methodology,
        })
    }
}

/// Segments in first-encounter order, each keeping source record order.
fn partition_by_segment<'r>(
    members: &[&'r ClassifiedRecord],
) -> Vec<(String, Vec<&'r ClassifiedRecord>)> {
    let mut segments: Vec<(String, Vec<&'r ClassifiedRecord>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for entry in members {
        match index.get(entry.segment.as_str()) {
            Some(&slot) => segments[slot].1.push(*entry),
            None => {
                index.insert(entry.segment.as_str(), segments.len());
                segments.push((entry.segment.clone(), vec![*entry]));
            }
        }
    }

    segments
}

fn segment_detail(
    title: String,
    entries: &[&ClassifiedRecord],
    formula: SatisfactionFormula,
    themes: &ThemeAggregator<'_>,
) -> SegmentDetail {
    let themes_for = |kind: ThemeKind| -> Vec<Theme> {
        themes.aggregate(entries.iter().map(|entry| &entry.record), kind)
    };

    SegmentDetail {
        title,
        total_ratings: entries.len(),
        total_comments: count_comments(entries),
        satisfaction: score(formula, entries),
        opportunities: themes_for(ThemeKind::CriticalPoint),
        highlights: themes_for(ThemeKind::Highlight),
    }
}

/// Unlabeled records stay out of the index but still count as ratings elsewhere.
fn score(formula: SatisfactionFormula, entries: &[&ClassifiedRecord]) -> f64 {
    formula.score(&SentimentCounts::from_labels(
        entries.iter().filter_map(|entry| entry.sentiment),
    ))
}

fn count_comments(entries: &[&ClassifiedRecord]) -> usize {
    entries
        .iter()
        .filter(|entry| entry.record.comment_text().is_some())
        .count()
}
