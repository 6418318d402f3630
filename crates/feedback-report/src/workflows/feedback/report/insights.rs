use super::super::themes::Theme;
use chrono::NaiveDateTime;

const NARRATIVE_THEMES: usize = 2;

/// `Del DD/MM/YYYY al DD/MM/YYYY` covering the first and last timestamp.
pub(crate) fn period_label<I>(timestamps: I) -> Option<String>
where
    I: IntoIterator<Item = NaiveDateTime>,
{
    let mut bounds: Option<(NaiveDateTime, NaiveDateTime)> = None;
    for timestamp in timestamps {
        bounds = Some(match bounds {
            None => (timestamp, timestamp),
            Some((first, last)) => (first.min(timestamp), last.max(timestamp)),
        });
    }

    bounds.map(|(first, last)| {
        format!(
            "Del {} al {}",
            first.format("%d/%m/%Y"),
            last.format("%d/%m/%Y")
        )
    })
}

/// Deterministic summary naming the leading themes of each kind. Inputs are already ranked.
pub(crate) fn narrative(opportunities: &[Theme], highlights: &[Theme]) -> String {
    let mut text = String::new();

    if opportunities.is_empty() {
        text.push_str("No se detectaron tendencias negativas significativas en los comentarios. ");
    } else {
        text.push_str(&format!(
            "El análisis identifica oportunidades de mejora clave, principalmente en {}. ",
            mentions(opportunities)
        ));
    }

    if highlights.is_empty() {
        text.push_str("No se encontraron temas positivos recurrentes.");
    } else {
        text.push_str(&format!(
            "Por otro lado, los clientes valoran positivamente aspectos como {}.",
            mentions(highlights)
        ));
    }

    text
}

fn mentions(themes: &[Theme]) -> String {
    themes
        .iter()
        .take(NARRATIVE_THEMES)
        .map(|theme| format!("**{}** ({} menciones)", theme.tag, theme.count))
        .collect::<Vec<_>>()
        .join(" y ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn theme(tag: &str, count: usize) -> Theme {
        Theme {
            tag: tag.to_string(),
            count,
            examples: Vec::new(),
        }
    }

    #[test]
    fn period_spans_earliest_to_latest() {
        let at = |day: u32| {
            NaiveDate::from_ymd_opt(2025, 3, day)
                .expect("valid date")
                .and_hms_opt(8, 0, 0)
                .expect("valid time")
        };
        assert_eq!(
            period_label([at(14), at(2), at(9)]),
            Some("Del 02/03/2025 al 14/03/2025".to_string())
        );
        assert_eq!(period_label(Vec::<NaiveDateTime>::new()), None);
    }

    #[test]
    fn narrative_names_top_two_themes() {
        let text = narrative(
            &[theme("Espera", 5), theme("Precio", 3), theme("Ruido", 1)],
            &[theme("Limpieza", 4)],
        );
        assert_eq!(
            text,
            "El análisis identifica oportunidades de mejora clave, principalmente en \
             **Espera** (5 menciones) y **Precio** (3 menciones). Por otro lado, los clientes \
             valoran positivamente aspectos como **Limpieza** (4 menciones)."
        );
    }

    #[test]
    fn narrative_without_themes_uses_stock_sentences() {
        assert_eq!(
            narrative(&[], &[]),
            "No se detectaron tendencias negativas significativas en los comentarios. \
             No se encontraron temas positivos recurrentes."
        );
    }
}
