//! Logical text lines.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use super::{BBox, TextRun};

/// One or more runs sharing a visual baseline.
///
/// Lines are sealed on construction; downstream stages only read them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Line {
    /// The runs in this line, sorted left to right
    pub runs: Vec<TextRun>,
    /// Concatenated, NFC-normalized, whitespace-collapsed text
    pub text: String,
    /// Size of the run contributing the most characters
    pub font_size: f32,
    /// Weight of the run contributing the most characters
    pub bold: bool,
    /// 1-based page number
    pub page: u32,
    /// Union of the run boxes
    pub bbox: BBox,
}

impl Line {
    /// Seal a set of runs into a line.
    ///
    /// Runs are reordered left to right. The dominant run is the one with the
    /// most characters; ties go to the larger font size.
    pub fn from_runs(mut runs: Vec<TextRun>) -> Self {
        runs.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let dominant = runs.iter().max_by(|a, b| {
            a.char_count()
                .cmp(&b.char_count())
                .then(a.font_size.total_cmp(&b.font_size))
        });
        let (font_size, bold) = dominant.map(|r| (r.font_size, r.bold)).unwrap_or((0.0, false));
        let page = runs.first().map(|r| r.page).unwrap_or(0);
        let bbox = runs
            .iter()
            .map(|r| r.bbox)
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or_default();
        let text = normalize(&join_runs(&runs));

        Self {
            runs,
            text,
            font_size,
            bold,
            page,
            bbox,
        }
    }

    /// Vertical position of the line (top edge).
    pub fn y(&self) -> f32 {
        self.bbox.y0
    }

    /// Number of whitespace-separated words.
    pub fn word_count(&self) -> usize {
        self.text.split_whitespace().count()
    }

    /// Number of non-whitespace characters.
    pub fn char_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// True when the line has no letters or digits at all.
    pub fn is_blank_or_punctuation(&self) -> bool {
        !self.text.chars().any(|c| c.is_alphanumeric())
    }

    /// True when every letter is uppercase (and there is at least one).
    pub fn is_uppercase(&self) -> bool {
        let mut letters = self.text.chars().filter(|c| c.is_alphabetic()).peekable();
        letters.peek().is_some() && letters.all(|c| c.is_uppercase())
    }

    /// True when every significant word starts with an uppercase letter.
    ///
    /// Short function words ("of", "and", ...) and words that do not start
    /// with a letter are ignored.
    pub fn is_title_case(&self) -> bool {
        let mut significant = self
            .text
            .split_whitespace()
            .filter(|w| w.chars().next().is_some_and(|c| c.is_alphabetic()))
            .filter(|w| !is_minor_word(w))
            .peekable();
        significant.peek().is_some()
            && significant.all(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
    }

    /// True when the line ends with `.`, `,` or `;`.
    pub fn ends_with_terminal_punctuation(&self) -> bool {
        self.text.ends_with(['.', ',', ';'])
    }
}

fn is_minor_word(word: &str) -> bool {
    const MINOR: [&str; 14] = [
        "a", "an", "and", "as", "at", "by", "for", "in", "of", "on", "or", "the", "to", "with",
    ];
    MINOR.contains(&word.to_lowercase().as_str())
}

/// Concatenate runs, inserting a space where the horizontal gap between two
/// runs is wider than a fraction of a character.
fn join_runs(runs: &[TextRun]) -> String {
    let mut result = String::new();

    for (i, run) in runs.iter().enumerate() {
        if i > 0 {
            let prev = &runs[i - 1];
            let gap = run.bbox.x0 - prev.bbox.x1;

            let char_count = run.text.chars().count();
            let avg_char_width = if char_count > 0 && run.bbox.width() > 0.0 {
                run.bbox.width() / char_count as f32
            } else {
                run.font_size * 0.5
            };

            let both_spaceless = prev
                .text
                .chars()
                .last()
                .is_some_and(is_spaceless_script_char)
                && run.text.chars().next().is_some_and(is_spaceless_script_char);
            let has_space = prev.text.ends_with(char::is_whitespace)
                || run.text.starts_with(char::is_whitespace);

            if gap > avg_char_width * 0.2 && !both_spaceless && !has_space {
                result.push(' ');
            }
        }
        result.push_str(&run.text);
    }

    result
}

fn normalize(text: &str) -> String {
    let nfc: String = text.nfc().collect();
    nfc.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Scripts written without spaces between words (Chinese, Japanese kana).
/// Korean Hangul uses word spaces and is not included.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}
