//! Cross-page index of recurring lines (running headers and footers).

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;

use crate::model::Line;

use super::config::InferenceConfig;
use super::rules::{has_keyword_prefix, numbering_depth};

/// A page number closing a running line: "page 3", "page 3 of 10",
/// "report | 3", "— 12", or a bare "3" / "3 of 10".
static PAGE_NUMBER_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bpage\s+\d+(?:\s*(?:of|/)\s*\d+)?|[|·•–—-]\s*\d+|^\d+(?:\s*(?:of|/)\s*\d+)?)$")
        .expect("valid page number regex")
});

/// Positions at which each normalized line text occurs.
#[derive(Debug, Clone, Default)]
pub struct RepeatedLineIndex {
    occurrences: HashMap<String, Vec<(u32, f32)>>,
    band: f32,
    min_pages: usize,
}

impl RepeatedLineIndex {
    /// Index every line of the document.
    pub fn build<'a, I>(lines: I, config: &InferenceConfig) -> Self
    where
        I: IntoIterator<Item = &'a Line>,
    {
        let mut occurrences: HashMap<String, Vec<(u32, f32)>> = HashMap::new();
        for line in lines {
            let key = repeat_key(&line.text);
            if key.is_empty() {
                continue;
            }
            occurrences
                .entry(key)
                .or_default()
                .push((line.page, line.y()));
        }

        Self {
            occurrences,
            band: config.repeat_band,
            min_pages: config.repeat_min_pages,
        }
    }

    /// Number of distinct pages carrying the same text within the vertical
    /// band around this line.
    pub fn page_count(&self, line: &Line) -> usize {
        let Some(positions) = self.occurrences.get(&repeat_key(&line.text)) else {
            return 0;
        };
        positions
            .iter()
            .filter(|(_, y)| (y - line.y()).abs() <= self.band)
            .map(|(page, _)| *page)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Whether the line behaves like a running header or footer.
    pub fn is_repeated(&self, line: &Line) -> bool {
        self.page_count(line) >= self.min_pages
    }
}

/// Case-folded text with whitespace collapsed. A trailing page number is
/// replaced by `#` so that "Page 3" and "Page 4" share a key; numbered and
/// keyword headings such as "Chapter 2" keep their digits.
fn repeat_key(text: &str) -> String {
    let key = text
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ");

    if numbering_depth(&key).is_some() || has_keyword_prefix(&key) {
        return key;
    }
    match PAGE_NUMBER_TAIL.find(&key) {
        Some(tail) => format!("{}#", &key[..tail.start()]),
        None => key,
    }
}
