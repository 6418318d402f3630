use super::{escape_xml, RenderError, RenderedArtifact, WordCloudRenderer};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::sync::OnceLock;

const MAX_WORDS: usize = 75;
const MIN_WORD_CHARS: usize = 3;

const STOPWORDS_ES: &[&str] = &[
    "de", "la", "el", "en", "y", "que", "un", "una", "los", "las", "es", "muy", "por", "con", "se",
    "no", "del", "al", "me", "le", "lo", "su", "mi", "para", "como", "mas", "más", "pero", "este",
    "esta", "todo", "todos", "fue", "era", "ha", "ser", "si", "hay", "tiene", "son", "sin", "sobre",
    "a", "e", "i", "o", "u",
];

fn stopwords() -> &'static HashSet<&'static str> {
    static WORDS: OnceLock<HashSet<&'static str>> = OnceLock::new();
    WORDS.get_or_init(|| STOPWORDS_ES.iter().copied().collect())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordFrequency {
    pub word: String,
    pub count: usize,
}

/// Most frequent words of a text blob: lower-cased, stopwords and short tokens removed,
/// ties alphabetical, at most 75 entries.
pub fn word_frequencies(text: &str) -> Vec<WordFrequency> {
    let lowered = text.to_lowercase();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in lowered.split(|ch: char| !ch.is_alphanumeric()) {
        if token.chars().count() < MIN_WORD_CHARS || stopwords().contains(token) {
            continue;
        }
        *counts.entry(token).or_default() += 1;
    }

    let mut words: Vec<WordFrequency> = counts
        .into_iter()
        .map(|(word, count)| WordFrequency {
            word: word.to_string(),
            count,
        })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words.truncate(MAX_WORDS);
    words
}

/// Flowed word cloud: font size scales with frequency, one colour per cloud.
#[derive(Debug, Clone, Copy)]
pub struct SvgWordCloud {
    pub width: u32,
    pub height: u32,
    pub min_font: f64,
    pub max_font: f64,
}

impl Default for SvgWordCloud {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            min_font: 12.0,
            max_font: 56.0,
        }
    }
}

impl SvgWordCloud {
    fn font_size(&self, count: usize, top: usize) -> f64 {
        if top <= 1 {
            return self.max_font;
        }
        let share = (count.saturating_sub(1)) as f64 / (top - 1) as f64;
        self.min_font + share * (self.max_font - self.min_font)
    }
}

impl WordCloudRenderer for SvgWordCloud {
    fn render(&self, text: &str, color: &str) -> Result<RenderedArtifact, RenderError> {
        let words = word_frequencies(text);
        let Some(top) = words.first().map(|word| word.count) else {
            return Err(RenderError::NothingToDraw);
        };

        let width = f64::from(self.width);
        let height = f64::from(self.height);
        let padding = 10.0;
        let mut svg = String::new();
        write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif"><rect width="100%" height="100%" fill="white"/>"#,
            w = self.width,
            h = self.height
        )?;

        let (mut x, mut line_top, mut line_height) = (padding, padding, 0.0_f64);
        for entry in &words {
            let size = self.font_size(entry.count, top);
            // rough advance width for a proportional font
            let advance = entry.word.chars().count() as f64 * size * 0.6;
            if x + advance > width - padding && x > padding {
                x = padding;
                line_top += line_height + 4.0;
                line_height = 0.0;
            }
            if line_top + size > height - padding {
                break;
            }

            write!(
                svg,
                r#"<text x="{x:.1}" y="{y:.1}" font-size="{size:.1}" fill="{color}">{word}</text>"#,
                y = line_top + size,
                color = escape_xml(color),
                word = escape_xml(&entry.word)
            )?;
            x += advance + size * 0.4;
            line_height = line_height.max(size);
        }

        svg.push_str("</svg>");
        Ok(RenderedArtifact::svg(svg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_and_short_tokens() {
        let words = word_frequencies("La fila es muy lenta, la FILA no avanza y el baño está sucio");
        let ranked: Vec<(&str, usize)> = words
            .iter()
            .map(|entry| (entry.word.as_str(), entry.count))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("fila", 2),
                ("avanza", 1),
                ("baño", 1),
                ("está", 1),
                ("lenta", 1),
                ("sucio", 1)
            ]
        );
    }

    #[test]
    fn caps_the_vocabulary() {
        let text: String = (0..200).map(|n| format!("palabra{n} ")).collect();
        assert_eq!(word_frequencies(&text).len(), 75);
    }

    #[test]
    fn renders_words_in_the_requested_colour() {
        let artifact = SvgWordCloud::default()
            .render("espera espera espera precio", "#d62728")
            .expect("cloud renders");
        assert!(artifact.body.contains(r##"fill="#d62728">espera</text>"##));
        assert!(artifact.body.contains(">precio</text>"));
    }

    #[test]
    fn only_stopwords_is_nothing_to_draw() {
        assert!(matches!(
            SvgWordCloud::default().render("de la que por", "#2ca02c"),
            Err(RenderError::NothingToDraw)
        ));
    }
}
