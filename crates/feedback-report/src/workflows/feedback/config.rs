use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which satisfaction formula a report uses. One formula per report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SatisfactionFormula {
    /// `(VP - N - VN) / total * 100`; only the top band counts as promoters.
    NetPromoter,
    /// `((VP + P) - (VN + N)) / total * 100`.
    WeightedShare,
}

impl SatisfactionFormula {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NetPromoter => "Net Promoter",
            Self::WeightedShare => "Proporción ponderada",
        }
    }
}

impl FromStr for SatisfactionFormula {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "net_promoter" | "nps" => Ok(Self::NetPromoter),
            "weighted_share" | "weighted" => Ok(Self::WeightedShare),
            other => Err(format!("unknown satisfaction formula '{other}'")),
        }
    }
}

/// What to do with a record that has neither comment nor usable rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingLabelPolicy {
    /// Score it as a `Neutral` vote: it stays in the denominator, adds to no band.
    Neutral,
    /// Count it in totals but leave it out of every satisfaction index.
    Exclude,
}

impl FromStr for MissingLabelPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "neutral" => Ok(Self::Neutral),
            "exclude" | "skip" => Ok(Self::Exclude),
            other => Err(format!("unknown missing-label policy '{other}'")),
        }
    }
}

/// Field(s) the second grouping level is keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKey {
    Area,
    AreaAndLocation,
}

impl FromStr for SegmentKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "area" | "sector" => Ok(Self::Area),
            "area_and_location" | "area_location" => Ok(Self::AreaAndLocation),
            other => Err(format!("unknown segment key '{other}'")),
        }
    }
}

/// Knobs for one analysis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub formula: SatisfactionFormula,
    pub missing_label: MissingLabelPolicy,
    pub segment_key: SegmentKey,
    /// Tag value meaning "no specific theme".
    pub theme_sentinel: String,
    pub example_limit: usize,
    /// Substring of the room/hall column that marks a VIP visit.
    pub vip_marker: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            formula: SatisfactionFormula::NetPromoter,
            missing_label: MissingLabelPolicy::Neutral,
            segment_key: SegmentKey::Area,
            theme_sentinel: "Otros".to_string(),
            example_limit: 3,
            vip_marker: "VIP".to_string(),
        }
    }
}
