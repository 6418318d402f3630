use super::config::SatisfactionFormula;
use super::domain::SentimentLabel;
use serde::{Deserialize, Serialize};

/// Per-label tallies for one record collection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(rename = "muy_negativa")]
    pub very_negative: usize,
    #[serde(rename = "negativa")]
    pub negative: usize,
    #[serde(rename = "neutral")]
    pub neutral: usize,
    #[serde(rename = "positiva")]
    pub positive: usize,
    #[serde(rename = "muy_positiva")]
    pub very_positive: usize,
}

impl SentimentCounts {
    pub fn from_labels<I>(labels: I) -> Self
    where
        I: IntoIterator<Item = SentimentLabel>,
    {
        let mut counts = Self::default();
        for label in labels {
            counts.add(label);
        }
        counts
    }

    pub fn add(&mut self, label: SentimentLabel) {
        *self.slot(label) += 1;
    }

    pub fn get(&self, label: SentimentLabel) -> usize {
        match label {
            SentimentLabel::VeryNegative => self.very_negative,
            SentimentLabel::Negative => self.negative,
            SentimentLabel::Neutral => self.neutral,
            SentimentLabel::Positive => self.positive,
            SentimentLabel::VeryPositive => self.very_positive,
        }
    }

    pub fn total(&self) -> usize {
        self.very_negative + self.negative + self.neutral + self.positive + self.very_positive
    }

    /// Counts in `SentimentLabel::ordered()` order.
    pub fn ordered(&self) -> [(SentimentLabel, usize); 5] {
        SentimentLabel::ordered().map(|label| (label, self.get(label)))
    }

    fn slot(&mut self, label: SentimentLabel) -> &mut usize {
        match label {
            SentimentLabel::VeryNegative => &mut self.very_negative,
            SentimentLabel::Negative => &mut self.negative,
            SentimentLabel::Neutral => &mut self.neutral,
            SentimentLabel::Positive => &mut self.positive,
            SentimentLabel::VeryPositive => &mut self.very_positive,
        }
    }
}

impl SatisfactionFormula {
    /// Satisfaction index in `[-100, 100]`, rounded to one decimal. Empty counts score `0.0`.
    pub fn score(self, counts: &SentimentCounts) -> f64 {
        let total = counts.total();
        if total == 0 {
            return 0.0;
        }

        let total = total as f64;
        let index = match self {
            Self::NetPromoter => {
                let promoters = counts.very_positive as f64;
                let detractors = (counts.negative + counts.very_negative) as f64;
                (promoters - detractors) / total * 100.0
            }
            Self::WeightedShare => {
                let positive = (counts.very_positive + counts.positive) as f64;
                let negative = (counts.very_negative + counts.negative) as f64;
                (positive / total - negative / total) * 100.0
            }
        };

        round_one_decimal(index).clamp(-100.0, 100.0)
    }
}

pub fn satisfaction_index<I>(formula: SatisfactionFormula, labels: I) -> f64
where
    I: IntoIterator<Item = SentimentLabel>,
{
    formula.score(&SentimentCounts::from_labels(labels))
}

fn round_one_decimal(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // avoid serializing "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::workflows::feedback::domain::SentimentLabel::*;

    #[test]
    fn empty_collection_scores_zero() {
        let empty: Vec<SentimentLabel> = Vec::new();
        assert_eq!(
            satisfaction_index(SatisfactionFormula::NetPromoter, empty.clone()),
            0.0
        );
        assert_eq!(satisfaction_index(SatisfactionFormula::WeightedShare, empty), 0.0);
    }

    #[test]
    fn weighted_share_balances_positive_and_negative_bands() {
        let labels = [Positive, Positive, Negative, VeryNegative];
        assert_eq!(
            satisfaction_index(SatisfactionFormula::WeightedShare, labels),
            0.0
        );
    }

    #[test]
    fn net_promoter_only_counts_top_band_as_promoters() {
        let labels = [Positive, Positive, Negative, VeryNegative];
        assert_eq!(
            satisfaction_index(SatisfactionFormula::NetPromoter, labels),
            -50.0
        );

        let labels = [VeryPositive, VeryPositive, Neutral];
        assert_eq!(
            satisfaction_index(SatisfactionFormula::NetPromoter, labels),
            66.7
        );
    }

    #[test]
    fn neutral_votes_dilute_the_index() {
        let labels = [VeryPositive, Neutral, Neutral, Neutral];
        assert_eq!(
            satisfaction_index(SatisfactionFormula::WeightedShare, labels),
            25.0
        );
    }

    #[test]
    fn counts_follow_canonical_order() {
        let counts = SentimentCounts::from_labels([VeryPositive, Negative, Negative]);
        let ordered: Vec<usize> = counts.ordered().iter().map(|(_, n)| *n).collect();
        assert_eq!(ordered, vec![0, 2, 0, 0, 1]);
        assert_eq!(counts.total(), 3);
    }

    fn label_strategy() -> impl Strategy<Value = SentimentLabel> {
        prop_oneof![
            Just(VeryNegative),
            Just(Negative),
            Just(Neutral),
            Just(Positive),
            Just(VeryPositive),
        ]
    }

    proptest! {
        #[test]
        fn both_formulas_stay_within_bounds(labels in proptest::collection::vec(label_strategy(), 1..200)) {
            for formula in [SatisfactionFormula::NetPromoter, SatisfactionFormula::WeightedShare] {
                let index = satisfaction_index(formula, labels.iter().copied());
                prop_assert!((-100.0..=100.0).contains(&index), "{formula:?} produced {index}");
            }
        }
    }
}
