use super::domain::{FeedbackRecord, ThemeKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A recurring annotation with its mention count and sample comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    #[serde(rename = "tema")]
    pub tag: String,
    #[serde(rename = "cantidad")]
    pub count: usize,
    #[serde(rename = "ejemplos", default)]
    pub examples: Vec<String>,
}

/// Builds ranked theme lists from one annotation column.
///
/// Ranking is by count descending; equal counts keep the order in which the
/// tag was first encountered.
#[derive(Debug, Clone, Copy)]
pub struct ThemeAggregator<'a> {
    sentinel: &'a str,
    example_limit: usize,
}

impl<'a> ThemeAggregator<'a> {
    pub fn new(sentinel: &'a str, example_limit: usize) -> Self {
        Self {
            sentinel,
            example_limit,
        }
    }

    pub fn aggregate<'r, I>(&self, records: I, kind: ThemeKind) -> Vec<Theme>
    where
        I: IntoIterator<Item = &'r FeedbackRecord>,
    {
        let mut themes: Vec<Theme> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records {
            let Some(tag) = record.tag(kind) else {
                continue;
            };
            if self.is_sentinel(tag) {
                continue;
            }

            let slot = *index.entry(tag.to_string()).or_insert_with(|| {
                themes.push(Theme {
                    tag: tag.to_string(),
                    count: 0,
                    examples: Vec::new(),
                });
                themes.len() - 1
            });

            let theme = &mut themes[slot];
            theme.count += 1;
            if theme.examples.len() < self.example_limit {
                if let Some(comment) = record.comment_text() {
                    theme.examples.push(comment.to_string());
                }
            }
        }

        rank(&mut themes);
        themes
    }

    fn is_sentinel(&self, tag: &str) -> bool {
        tag.eq_ignore_ascii_case(self.sentinel.trim())
    }
}

/// Merges per-segment lists into one global ranking: counts are summed and
/// example lists concatenated in segment order.
pub fn merge_themes<'t, I>(lists: I) -> Vec<Theme>
where
    I: IntoIterator<Item = &'t [Theme]>,
{
    let mut merged: Vec<Theme> = Vec::new();
    let mut index: HashMap<&'t str, usize> = HashMap::new();

    for list in lists {
        for theme in list {
            match index.get(theme.tag.as_str()) {
                Some(&slot) => {
                    merged[slot].count += theme.count;
                    merged[slot].examples.extend(theme.examples.iter().cloned());
                }
                None => {
                    index.insert(theme.tag.as_str(), merged.len());
                    merged.push(theme.clone());
                }
            }
        }
    }

    rank(&mut merged);
    merged
}

fn rank(themes: &mut [Theme]) {
    // stable sort keeps first-encounter order for ties
    themes.sort_by(|a, b| b.count.cmp(&a.count));
}
