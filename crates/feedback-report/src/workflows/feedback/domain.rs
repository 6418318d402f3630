use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Canonical emotional valence of a single visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Muy Negativa")]
    VeryNegative,
    #[serde(rename = "Negativa")]
    Negative,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Positiva")]
    Positive,
    #[serde(rename = "Muy Positiva")]
    VeryPositive,
}

impl SentimentLabel {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::VeryNegative,
            Self::Negative,
            Self::Neutral,
            Self::Positive,
            Self::VeryPositive,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::VeryNegative => "Muy Negativa",
            Self::Negative => "Negativa",
            Self::Neutral => "Neutral",
            Self::Positive => "Positiva",
            Self::VeryPositive => "Muy Positiva",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::VeryNegative => "#d62728",
            Self::Negative => "#ff7f0e",
            Self::Neutral => "#cccccc",
            Self::Positive => "#98df8a",
            Self::VeryPositive => "#2ca02c",
        }
    }

    pub const fn is_negative(self) -> bool {
        matches!(self, Self::VeryNegative | Self::Negative)
    }

    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Positive | Self::VeryPositive)
    }

    /// Parses the categorical rating column. Unknown vocabulary yields `None`.
    pub fn from_rating(raw: &str) -> Option<Self> {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();

        match normalized.as_str() {
            "muy negativa" | "muy negativo" | "very negative" => Some(Self::VeryNegative),
            "negativa" | "negativo" | "negative" => Some(Self::Negative),
            "neutral" | "neutra" | "neutro" => Some(Self::Neutral),
            "positiva" | "positivo" | "positive" => Some(Self::Positive),
            "muy positiva" | "muy positivo" | "very positive" => Some(Self::VeryPositive),
            _ => None,
        }
    }
}

/// Which label vocabulary a run resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentScale {
    /// Classifier available, or a `Neutral` vote resolved from a rating or the default.
    FiveLevel,
    /// Rating-only run whose labels never include `Neutral`.
    FourLevel,
}

impl SentimentScale {
    pub const fn label(self) -> &'static str {
        match self {
            Self::FiveLevel => "5 niveles",
            Self::FourLevel => "4 niveles",
        }
    }

    pub fn levels(self) -> &'static [SentimentLabel] {
        static FIVE: [SentimentLabel; 5] = SentimentLabel::ordered();
        static FOUR: [SentimentLabel; 4] = [
            SentimentLabel::VeryNegative,
            SentimentLabel::Negative,
            SentimentLabel::Positive,
            SentimentLabel::VeryPositive,
        ];
        match self {
            Self::FiveLevel => &FIVE[..],
            Self::FourLevel => &FOUR[..],
        }
    }
}

/// Physical area partition a visit is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaGroup {
    #[serde(rename = "Baños")]
    Restrooms,
    #[serde(rename = "Atención al Cliente")]
    CustomerService,
    #[serde(rename = "Cajas")]
    Cashiers,
    #[serde(rename = "Restaurantes")]
    Restaurants,
    #[serde(rename = "Autoservicios")]
    SelfService,
    #[serde(rename = "Traslados")]
    Transfers,
    #[serde(rename = "VIP")]
    Vip,
    #[serde(rename = "Otros")]
    Other,
}

impl AreaGroup {
    /// Display order used by every report section.
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Restrooms,
            Self::CustomerService,
            Self::Cashiers,
            Self::Restaurants,
            Self::SelfService,
            Self::Transfers,
            Self::Vip,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Restrooms => "Baños",
            Self::CustomerService => "Atención al Cliente",
            Self::Cashiers => "Cajas",
            Self::Restaurants => "Restaurantes",
            Self::SelfService => "Autoservicios",
            Self::Transfers => "Traslados",
            Self::Vip => "VIP",
            Self::Other => "Otros",
        }
    }

    pub fn position(self) -> usize {
        Self::ordered()
            .iter()
            .position(|group| *group == self)
            .unwrap_or(Self::ordered().len())
    }
}

/// Annotation column a theme list is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeKind {
    CriticalPoint,
    Highlight,
}

impl ThemeKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CriticalPoint => "Oportunidades de Mejora",
            Self::Highlight => "Puntos Destacados",
        }
    }
}

/// One row of the feedback export after schema normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackRecord {
    pub timestamp: NaiveDateTime,
    pub comment: Option<String>,
    pub rating: Option<SentimentLabel>,
    pub area: String,
    pub room: String,
    pub location: Option<String>,
    pub critical_point: Option<String>,
    pub highlight: Option<String>,
}

impl FeedbackRecord {
    /// Comment text with surrounding whitespace removed, if any remains.
    pub fn comment_text(&self) -> Option<&str> {
        self.comment
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty())
    }

    pub fn tag(&self, kind: ThemeKind) -> Option<&str> {
        let value = match kind {
            ThemeKind::CriticalPoint => self.critical_point.as_deref(),
            ThemeKind::Highlight => self.highlight.as_deref(),
        };
        value.map(str::trim).filter(|tag| !tag.is_empty())
    }
}

/// A record with its resolved sentiment and grouping keys attached.
#[derive(Debug, Clone)]
pub struct ClassifiedRecord {
    pub record: FeedbackRecord,
    /// `None` only under `MissingLabelPolicy::Exclude` for records with no recoverable label.
    pub sentiment: Option<SentimentLabel>,
    pub group: AreaGroup,
    pub segment: String,
}
