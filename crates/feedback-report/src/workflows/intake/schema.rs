use super::normalizer::normalize_header;
use std::collections::HashMap;
use std::sync::OnceLock;
use thiserror::Error;

/// Fields the pipeline reads from an export, independent of how the header is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    Date,
    Hour,
    Comment,
    RatingDescription,
    CriticalPoints,
    Highlights,
    Room,
    Area,
    Location,
}

impl CanonicalField {
    pub const fn ordered() -> [Self; 9] {
        [
            Self::Date,
            Self::Hour,
            Self::Comment,
            Self::RatingDescription,
            Self::CriticalPoints,
            Self::Highlights,
            Self::Room,
            Self::Area,
            Self::Location,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Date => "fecha",
            Self::Hour => "hora",
            Self::Comment => "comentarios",
            Self::RatingDescription => "calificacion_descripcion",
            Self::CriticalPoints => "puntos_criticos",
            Self::Highlights => "destacados",
            Self::Room => "sala",
            Self::Area => "sector",
            Self::Location => "ubicacion",
        }
    }

    pub const fn required(self) -> bool {
        !matches!(self, Self::Hour | Self::Location)
    }

    const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Date => &["fecha", "date", "fecha_hora", "timestamp"],
            Self::Hour => &["hora", "hour", "time"],
            Self::Comment => &["comentarios", "comentario", "comments", "comment"],
            Self::RatingDescription => &[
                "calificacion_descripcion",
                "calificación_descripción",
                "calificación_descripcion",
                "rating_description",
            ],
            Self::CriticalPoints => &["puntos_criticos", "puntos_críticos", "critical_points"],
            Self::Highlights => &["destacados", "highlights"],
            Self::Room => &["sala", "room", "hall"],
            Self::Area => &["sector", "area", "área"],
            Self::Location => &["ubicacion", "ubicación", "location"],
        }
    }
}

fn alias_map() -> &'static HashMap<String, CanonicalField> {
    static MAP: OnceLock<HashMap<String, CanonicalField>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = HashMap::new();
        for field in CanonicalField::ordered() {
            for alias in field.aliases() {
                map.insert(normalize_header(alias), field);
            }
        }
        map
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "missing required columns: {} (found: [{}]; normalized: [{}])",
    .missing.join(", "),
    .found_raw.join(", "),
    .found_normalized.join(", ")
)]
pub struct SchemaError {
    pub missing: Vec<&'static str>,
    pub found_raw: Vec<String>,
    pub found_normalized: Vec<String>,
}

/// Column index for every canonical field present in a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMapping {
    columns: HashMap<CanonicalField, usize>,
}

impl SchemaMapping {
    /// Validates the header row all-or-nothing. When two headers map to the
    /// same field the leftmost one is used.
    pub fn from_headers<'h, I>(headers: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = &'h str>,
    {
        let aliases = alias_map();
        let mut columns = HashMap::new();
        let mut found_raw = Vec::new();
        let mut found_normalized = Vec::new();

        for (index, raw) in headers.into_iter().enumerate() {
            let normalized = normalize_header(raw);
            if let Some(field) = aliases.get(&normalized) {
                columns.entry(*field).or_insert(index);
            }
            found_raw.push(raw.to_string());
            found_normalized.push(normalized);
        }

        let missing: Vec<&'static str> = CanonicalField::ordered()
            .into_iter()
            .filter(|field| field.required() && !columns.contains_key(field))
            .map(CanonicalField::name)
            .collect();

        if !missing.is_empty() {
            return Err(SchemaError {
                missing,
                found_raw,
                found_normalized,
            });
        }

        Ok(Self { columns })
    }

    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const HEADERS: [&str; 7] = [
        "Fecha",
        "Comentarios",
        "Calificacion Descripcion",
        "Puntos Criticos",
        "Destacados",
        "Sala",
        "Sector",
    ];

    #[test]
    fn maps_every_required_field() {
        let mapping = SchemaMapping::from_headers(HEADERS).expect("schema is complete");
        assert_eq!(mapping.column(CanonicalField::Date), Some(0));
        assert_eq!(mapping.column(CanonicalField::RatingDescription), Some(2));
        assert_eq!(mapping.column(CanonicalField::Area), Some(6));
        assert_eq!(mapping.column(CanonicalField::Hour), None);
    }

    #[test]
    fn accented_and_optional_aliases_resolve() {
        let headers = [
            "fecha", "hora", "comentarios", "Calificación Descripción", "Puntos Críticos",
            "destacados", "sala", "sector", "Ubicación",
        ];
        let mapping = SchemaMapping::from_headers(headers).expect("schema is complete");
        assert_eq!(mapping.column(CanonicalField::Hour), Some(1));
        assert_eq!(mapping.column(CanonicalField::CriticalPoints), Some(4));
        assert_eq!(mapping.column(CanonicalField::Location), Some(8));
    }

    #[test]
    fn reports_every_missing_field_with_headers_seen() {
        let err = SchemaMapping::from_headers(["Fecha", "Comentario Libre", "Sala"])
            .expect_err("schema is incomplete");
        assert_eq!(
            err.missing,
            vec!["comentarios", "calificacion_descripcion", "puntos_criticos", "destacados", "sector"]
        );
        assert_eq!(err.found_raw, vec!["Fecha", "Comentario Libre", "Sala"]);
        assert_eq!(err.found_normalized, vec!["fecha", "comentario_libre", "sala"]);
        let message = err.to_string();
        assert!(message.contains("puntos_criticos"));
        assert!(message.contains("Comentario Libre"));
    }

    #[test]
    fn leftmost_duplicate_wins() {
        let mut headers = HEADERS.to_vec();
        headers.push("SECTOR");
        let mapping = SchemaMapping::from_headers(headers).expect("schema is complete");
        assert_eq!(mapping.column(CanonicalField::Area), Some(6));
    }

    fn respell(header: &str, upper: &[bool], pad: usize) -> String {
        let cased: String = header
            .chars()
            .zip(upper.iter().cycle())
            .map(|(ch, up)| if *up { ch.to_ascii_uppercase() } else { ch })
            .collect();
        let spaced = cased.replace(' ', &" ".repeat(pad + 1));
        format!("{}{}{}", " ".repeat(pad), spaced, " ".repeat(pad))
    }

    proptest! {
        #[test]
        fn header_spelling_does_not_change_the_mapping(
            upper in proptest::collection::vec(any::<bool>(), 1..16),
            pad in 0usize..3,
        ) {
            let respelled: Vec<String> = HEADERS.iter().map(|h| respell(h, &upper, pad)).collect();
            let baseline = SchemaMapping::from_headers(HEADERS).expect("baseline schema");
            let mapping = SchemaMapping::from_headers(respelled.iter().map(String::as_str))
                .expect("respelled schema");
            prop_assert_eq!(mapping, baseline);
        }
    }
}
