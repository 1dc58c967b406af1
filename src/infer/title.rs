//! Title detection on the first page.

use crate::model::{Line, Title};

use super::config::InferenceConfig;
use super::rules::is_boilerplate;

/// The chosen title and the page-1 lines it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleSelection {
    pub title: Title,
    /// Indices into the page-1 line slice
    pub line_indices: Vec<usize>,
}

impl TitleSelection {
    /// Whether the given page-1 line belongs to the title.
    pub fn contains(&self, index: usize) -> bool {
        self.line_indices.contains(&index)
    }
}

/// Pick the title from page 1's lines (in reading order).
///
/// The topmost line set in the largest size starts the title; directly
/// following lines in the same size are merged, up to `max_title_lines`.
/// Returns `None` when page 1 has no usable text.
pub fn detect_title(page_one: &[Line], config: &InferenceConfig) -> Option<TitleSelection> {
    let eligible = |line: &Line| !line.is_blank_or_punctuation() && !is_boilerplate(&line.text);

    let max_size = page_one
        .iter()
        .filter(|l| eligible(*l))
        .map(|l| l.font_size)
        .fold(None, |acc: Option<f32>, size| Some(acc.map_or(size, |m| m.max(size))))?;
    let same_size = |line: &Line| (line.font_size - max_size).abs() <= config.title_size_tolerance;

    let start = page_one
        .iter()
        .position(|l| eligible(l) && same_size(l))?;

    let line_indices: Vec<usize> = (start..page_one.len())
        .take_while(|&i| eligible(&page_one[i]) && same_size(&page_one[i]))
        .take(config.max_title_lines)
        .collect();

    let text = line_indices
        .iter()
        .map(|&i| page_one[i].text.as_str())
        .collect::<Vec<_>>()
        .join(" ");

    log::debug!("Title: {:?} ({} lines, {:.1}pt)", text, line_indices.len(), max_size);

    Some(TitleSelection {
        title: Title { text },
        line_indices,
    })
}
