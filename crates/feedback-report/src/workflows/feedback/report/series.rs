use super::super::config::SatisfactionFormula;
use super::super::domain::ClassifiedRecord;
use super::super::scoring::SentimentCounts;
use super::views::{DailyPoint, HourlyBucket};
use chrono::{NaiveDate, Timelike};
use std::collections::BTreeMap;

pub(crate) fn daily_series(records: &[ClassifiedRecord], formula: SatisfactionFormula) -> Vec<DailyPoint> {
    let mut days: BTreeMap<NaiveDate, (usize, SentimentCounts)> = BTreeMap::new();
    for entry in records {
        let (total, counts) = days.entry(entry.record.timestamp.date()).or_default();
        *total += 1;
        if let Some(label) = entry.sentiment {
            counts.add(label);
        }
    }

    days.into_iter()
        .map(|(date, (total_ratings, counts))| DailyPoint {
            date,
            total_ratings,
            counts,
            satisfaction: formula.score(&counts),
        })
        .collect()
}

/// Always 24 buckets, hour 0 first.
pub(crate) fn hourly_profile(records: &[ClassifiedRecord], formula: SatisfactionFormula) -> Vec<HourlyBucket> {
    let mut hours = [(0usize, SentimentCounts::default()); 24];
    for entry in records {
        let (total, counts) = &mut hours[entry.record.timestamp.hour() as usize % 24];
        *total += 1;
        if let Some(label) = entry.sentiment {
            counts.add(label);
        }
    }

    hours
        .iter()
        .zip(0u32..)
        .map(|((total_ratings, counts), hour)| HourlyBucket {
            hour,
            total_ratings: *total_ratings,
            counts: *counts,
            satisfaction: formula.score(counts),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::feedback::domain::{AreaGroup, FeedbackRecord, SentimentLabel};

    fn entry(day: u32, hour: u32, sentiment: Option<SentimentLabel>) -> ClassifiedRecord {
        ClassifiedRecord {
            record: FeedbackRecord {
                timestamp: NaiveDate::from_ymd_opt(2025, 3, day)
                    .expect("valid date")
                    .and_hms_opt(hour, 0, 0)
                    .expect("valid time"),
                comment: None,
                rating: sentiment,
                area: "Cajas".to_string(),
                room: String::new(),
                location: None,
                critical_point: None,
                highlight: None,
            },
            sentiment,
            group: AreaGroup::Cashiers,
            segment: "Cajas".to_string(),
        }
    }

    #[test]
    fn days_are_chronological_with_their_own_index() {
        let records = vec![
            entry(2, 9, Some(SentimentLabel::VeryNegative)),
            entry(1, 9, Some(SentimentLabel::VeryPositive)),
            entry(1, 18, Some(SentimentLabel::Neutral)),
            entry(2, 10, None),
        ];

        let series = daily_series(&records, SatisfactionFormula::NetPromoter);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2025, 3, 1).expect("valid date"));
        assert_eq!(series[0].satisfaction, 50.0);
        assert_eq!(series[1].total_ratings, 2);
        assert_eq!(series[1].counts.total(), 1);
        assert_eq!(series[1].satisfaction, -100.0);
    }

    #[test]
    fn hourly_profile_has_every_hour() {
        let records = vec![
            entry(1, 9, Some(SentimentLabel::Positive)),
            entry(2, 9, Some(SentimentLabel::Negative)),
            entry(1, 23, Some(SentimentLabel::VeryPositive)),
        ];

        let profile = hourly_profile(&records, SatisfactionFormula::WeightedShare);
        assert_eq!(profile.len(), 24);
        assert_eq!(profile[9].total_ratings, 2);
        assert_eq!(profile[9].satisfaction, 0.0);
        assert_eq!(profile[23].satisfaction, 100.0);
        assert_eq!(profile[0].total_ratings, 0);
        assert_eq!(profile[0].satisfaction, 0.0);
    }
}
