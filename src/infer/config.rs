//! Tunable constants for heading inference.
//!
//! None of these values has a principled derivation; they are calibrated
//! against sample documents. Every field can be overridden from a JSON file
//! where missing fields keep their defaults.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for the inference pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Sizes must exceed the body baseline by more than this (pt) to be
    /// heading-eligible by size
    pub baseline_noise_margin: f32,

    /// Histogram bucket width (pt)
    pub size_quantum: f32,

    /// Baseline band for line grouping, as a fraction of the smaller font size
    pub line_tolerance_ratio: f32,

    /// Score per point above the baseline
    pub size_weight: f32,

    /// Upper bound on the size contribution
    pub size_score_cap: f32,

    /// Score for a bold line in a non-bold body
    pub bold_weight: f32,

    /// Score for all-caps or Title Case text
    pub casing_weight: f32,

    /// Score for a line shorter than the page's typical line
    pub short_line_weight: f32,

    /// A line is short when its word count is below this fraction of the
    /// page's average words per line
    pub short_line_ratio: f32,

    /// Score for a leading numbering scheme ("2.1.3 ")
    pub numbering_weight: f32,

    /// Score for a Chapter/Section/Appendix prefix
    pub keyword_weight: f32,

    /// Score for a line that does not end in `.`, `,` or `;`
    pub unterminated_weight: f32,

    /// Score for a line centred on the page's text extent
    pub centered_weight: f32,

    /// Maximum margin difference (pt) for a centred line
    pub centered_tolerance: f32,

    /// Minimum score for a line to become a candidate
    pub score_threshold: f32,

    /// Word count above which a punctuated line is treated as body text
    pub long_line_words: usize,

    /// Lines with more words than this are never headings
    pub max_heading_words: usize,

    /// Number of distinct pages a line must recur on to count as a running
    /// header or footer
    pub repeat_min_pages: usize,

    /// Vertical tolerance (pt) when matching repeated lines across pages
    pub repeat_band: f32,

    /// Lines within this many points of the page-1 maximum size share the
    /// title size
    pub title_size_tolerance: f32,

    /// Maximum number of lines merged into the title
    pub max_title_lines: usize,

    /// Score lines across pages in parallel
    pub parallel: bool,
}

impl InferenceConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Set the acceptance threshold.
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the short-line ratio.
    pub fn with_short_line_ratio(mut self, ratio: f32) -> Self {
        self.short_line_ratio = ratio;
        self
    }

    /// Set the long-line word threshold.
    pub fn with_long_line_words(mut self, words: usize) -> Self {
        self.long_line_words = words;
        self
    }

    /// Set the maximum heading length in words.
    pub fn with_max_heading_words(mut self, words: usize) -> Self {
        self.max_heading_words = words;
        self
    }

    /// Set the running header/footer recurrence threshold.
    pub fn with_repeat_min_pages(mut self, pages: usize) -> Self {
        self.repeat_min_pages = pages;
        self
    }

    /// Set the maximum number of title lines.
    pub fn with_max_title_lines(mut self, lines: usize) -> Self {
        self.max_title_lines = lines;
        self
    }

    /// Enable or disable parallel scoring.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel scoring.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("baseline_noise_margin", self.baseline_noise_margin),
            ("line_tolerance_ratio", self.line_tolerance_ratio),
            ("size_weight", self.size_weight),
            ("size_score_cap", self.size_score_cap),
            ("bold_weight", self.bold_weight),
            ("casing_weight", self.casing_weight),
            ("short_line_weight", self.short_line_weight),
            ("short_line_ratio", self.short_line_ratio),
            ("numbering_weight", self.numbering_weight),
            ("keyword_weight", self.keyword_weight),
            ("unterminated_weight", self.unterminated_weight),
            ("centered_weight", self.centered_weight),
            ("centered_tolerance", self.centered_tolerance),
            ("score_threshold", self.score_threshold),
            ("repeat_band", self.repeat_band),
            ("title_size_tolerance", self.title_size_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if !(self.size_quantum.is_finite() && self.size_quantum > 0.0) {
            return Err(Error::Config(format!(
                "size_quantum must be positive, got {}",
                self.size_quantum
            )));
        }
        if self.repeat_min_pages < 2 {
            return Err(Error::Config(
                "repeat_min_pages must be at least 2".to_string(),
            ));
        }
        if self.max_title_lines == 0 {
            return Err(Error::Config(
                "max_title_lines must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            baseline_noise_margin: 0.5,
            size_quantum: 0.1,
            line_tolerance_ratio: 0.3,
            size_weight: 0.5,
            size_score_cap: 4.0,
            bold_weight: 2.0,
            casing_weight: 1.0,
            short_line_weight: 1.0,
            short_line_ratio: 0.75,
            numbering_weight: 1.5,
            keyword_weight: 1.5,
            unterminated_weight: 0.5,
            centered_weight: 0.5,
            centered_tolerance: 20.0,
            score_threshold: 3.0,
            long_line_words: 12,
            max_heading_words: 20,
            repeat_min_pages: 3,
            repeat_band: 12.0,
            title_size_tolerance: 0.5,
            max_title_lines: 3,
            parallel: true,
        }
    }
}
