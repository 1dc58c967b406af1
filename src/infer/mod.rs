//! Heading inference: text runs in, title and leveled outline out.
//!
//! The pipeline runs in two passes over a document:
//!
//! 1. Runs are grouped into lines per page, then the whole document feeds the
//!    [`StyleProfile`] (font size histogram) and the [`RepeatedLineIndex`]
//!    (running headers and footers). Both are immutable afterwards.
//! 2. Every page is scored independently against those tables, in parallel
//!    when enabled. Candidates are then leveled globally, the title is taken
//!    from page 1 and the [`Outline`] is assembled.
//!
//! # Example
//!
//! ```
//! use pdfoutline::infer::{InferenceConfig, OutlineEngine};
//! use pdfoutline::model::{BBox, TextRun};
//!
//! let body = "Regular paragraph text that carries most of the characters.";
//! let runs = vec![
//!     TextRun::new("Annual Report", "Helvetica-Bold", 24.0, true, BBox::new(72.0, 72.0, 300.0, 96.0), 1),
//!     TextRun::new(body, "Helvetica", 11.0, false, BBox::new(72.0, 120.0, 500.0, 131.0), 1),
//!     TextRun::new(body, "Helvetica", 11.0, false, BBox::new(72.0, 140.0, 500.0, 151.0), 1),
//! ];
//!
//! let outline = OutlineEngine::new(InferenceConfig::default()).infer(&runs).unwrap();
//! assert_eq!(outline.title_text(), Some("Annual Report"));
//! ```

mod builder;
mod candidates;
mod config;
mod levels;
mod lines;
mod profile;
mod repeated;
pub mod rules;
mod title;

pub use builder::build_outline;
pub use candidates::{detect_candidates, HeadingCandidate};
pub use config::InferenceConfig;
pub use levels::{assign_levels, LeveledCandidate};
pub use lines::aggregate_lines;
pub use profile::{StyleCluster, StyleProfile};
pub use repeated::RepeatedLineIndex;
pub use rules::{Evaluation, PageStats, RuleContext, RuleSet};
pub use title::{detect_title, TitleSelection};

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::error::Result;
use crate::model::{Line, Outline, TextRun};

/// Page number the title is taken from.
const TITLE_PAGE: u32 = 1;

/// One page's lines in reading order.
#[derive(Debug, Clone)]
struct PageLines {
    page: u32,
    lines: Vec<Line>,
}

/// Document-wide tables from the first pass.
#[derive(Debug)]
struct DocumentTables {
    profile: StyleProfile,
    repeated: RepeatedLineIndex,
    avg_words: f32,
}

/// Rule evaluation for a single line, for calibration output.
#[derive(Debug, Clone)]
pub struct LineDiagnostic {
    pub line: Line,
    pub evaluation: Evaluation,
    /// Passed every veto and reached the threshold
    pub accepted: bool,
    /// Part of the detected title
    pub in_title: bool,
}

/// Everything the engine knows about a document, line by line.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub profile: StyleProfile,
    pub title: Option<TitleSelection>,
    pub lines: Vec<LineDiagnostic>,
}

/// Heading inference engine.
#[derive(Debug, Clone, Default)]
pub struct OutlineEngine {
    config: InferenceConfig,
    rules: RuleSet,
}

impl OutlineEngine {
    /// Create an engine with the standard rule set.
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            config,
            rules: RuleSet::standard(),
        }
    }

    /// Replace the rule set.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// The active configuration.
    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// The active rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Infer the title and outline of one document.
    ///
    /// Degenerate input (no runs, a single font size, an empty first page)
    /// yields an empty or partial outline, never an error. Errors are
    /// internal invariant violations only.
    pub fn infer(&self, runs: &[TextRun]) -> Result<Outline> {
        self.config.validate()?;

        let pages = self.aggregate(runs);
        let tables = self.first_pass(&pages)?;
        let page_one = pages
            .iter()
            .find(|p| p.page == TITLE_PAGE)
            .map(|p| p.lines.as_slice())
            .unwrap_or(&[]);

        let (title, candidates) = if self.config.parallel {
            rayon::join(
                || detect_title(page_one, &self.config),
                || {
                    pages
                        .par_iter()
                        .map(|p| self.score_page(p, &tables))
                        .collect::<Vec<_>>()
                },
            )
        } else {
            (
                detect_title(page_one, &self.config),
                pages
                    .iter()
                    .map(|p| self.score_page(p, &tables))
                    .collect::<Vec<_>>(),
            )
        };

        let candidates: Vec<HeadingCandidate> = candidates
            .into_iter()
            .flatten()
            .filter(|c| !is_title_line(&c.line, title.as_ref(), page_one))
            .collect();

        let leveled = assign_levels(candidates)?;
        build_outline(title, leveled)
    }

    /// Evaluate every line of the document against the rule set.
    pub fn diagnose(&self, runs: &[TextRun]) -> Result<Diagnostics> {
        self.config.validate()?;

        let pages = self.aggregate(runs);
        let tables = self.first_pass(&pages)?;
        let page_one = pages
            .iter()
            .find(|p| p.page == TITLE_PAGE)
            .map(|p| p.lines.as_slice())
            .unwrap_or(&[]);
        let title = detect_title(page_one, &self.config);

        let mut lines = Vec::new();
        for page in &pages {
            let stats = PageStats::compute(&page.lines, tables.avg_words);
            let ctx = self.context(&tables, &stats);
            for line in &page.lines {
                let evaluation = self.rules.evaluate(line, &ctx);
                let accepted = evaluation.is_accepted(self.config.score_threshold);
                lines.push(LineDiagnostic {
                    line: line.clone(),
                    evaluation,
                    accepted,
                    in_title: is_title_line(line, title.as_ref(), page_one),
                });
            }
        }

        Ok(Diagnostics {
            profile: tables.profile,
            title,
            lines,
        })
    }

    /// Group runs by page and merge each page's runs into lines.
    fn aggregate(&self, runs: &[TextRun]) -> Vec<PageLines> {
        let mut by_page: BTreeMap<u32, Vec<TextRun>> = BTreeMap::new();
        for run in runs {
            by_page.entry(run.page).or_default().push(run.clone());
        }

        let aggregate = |(page, runs): (u32, Vec<TextRun>)| PageLines {
            page,
            lines: aggregate_lines(&runs, &self.config),
        };

        if self.config.parallel {
            by_page.into_par_iter().map(aggregate).collect()
        } else {
            by_page.into_iter().map(aggregate).collect()
        }
    }

    /// Pass 1: document-wide statistics.
    fn first_pass(&self, pages: &[PageLines]) -> Result<DocumentTables> {
        let all_lines = || pages.iter().flat_map(|p| p.lines.iter());

        let profile = StyleProfile::build(all_lines(), &self.config);
        profile.validate()?;
        let repeated = RepeatedLineIndex::build(all_lines(), &self.config);

        let (words, count) = all_lines().fold((0usize, 0usize), |(w, n), line| {
            (w + line.word_count(), n + 1)
        });
        let avg_words = if count == 0 {
            0.0
        } else {
            words as f32 / count as f32
        };

        log::debug!(
            "First pass: {} pages, {} lines, {:.1} words/line",
            pages.len(),
            count,
            avg_words
        );

        Ok(DocumentTables {
            profile,
            repeated,
            avg_words,
        })
    }

    /// Pass 2 for one page.
    fn score_page(&self, page: &PageLines, tables: &DocumentTables) -> Vec<HeadingCandidate> {
        let stats = PageStats::compute(&page.lines, tables.avg_words);
        let ctx = self.context(tables, &stats);
        detect_candidates(&page.lines, &ctx, &self.rules)
    }

    fn context<'a>(&'a self, tables: &'a DocumentTables, stats: &'a PageStats) -> RuleContext<'a> {
        RuleContext {
            profile: &tables.profile,
            repeated: &tables.repeated,
            page: stats,
            config: &self.config,
        }
    }
}

/// Whether a line is part of the title, or repeats its text elsewhere.
fn is_title_line(line: &Line, title: Option<&TitleSelection>, page_one: &[Line]) -> bool {
    let Some(title) = title else {
        return false;
    };
    if line.text == title.title.text {
        return true;
    }
    line.page == TITLE_PAGE
        && page_one
            .iter()
            .enumerate()
            .any(|(i, l)| l == line && title.contains(i))
}

/// Infer an outline with the standard rules.
pub fn infer_outline(runs: &[TextRun], config: &InferenceConfig) -> Result<Outline> {
    OutlineEngine::new(config.clone()).infer(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, HeadingLevel};

    const BODY: &str = "Ordinary paragraph text that carries most of the characters here.";

    fn run(text: &str, size: f32, bold: bool, page: u32, y: f32) -> TextRun {
        TextRun::new(
            text,
            if bold { "Helvetica-Bold" } else { "Helvetica" },
            size,
            bold,
            BBox::new(72.0, y, 72.0 + text.len() as f32 * size * 0.45, y + size),
            page,
        )
    }

    fn report() -> Vec<TextRun> {
        vec![
            run("Annual Report", 24.0, true, 1, 72.0),
            run(BODY, 12.0, false, 1, 120.0),
            run("1. Introduction", 16.0, true, 2, 72.0),
            run(BODY, 11.0, false, 2, 100.0),
            run(BODY, 11.0, false, 2, 115.0),
            run(BODY, 11.0, false, 2, 130.0),
        ]
    }

    #[test]
    fn test_infer_report() {
        let outline = OutlineEngine::new(InferenceConfig::default())
            .infer(&report())
            .unwrap();

        assert_eq!(outline.title_text(), Some("Annual Report"));
        assert_eq!(outline.headings.len(), 1);
        assert_eq!(outline.headings[0].text, "1. Introduction");
        assert_eq!(outline.headings[0].level, HeadingLevel::H1);
        assert_eq!(outline.headings[0].page, 2);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let parallel = infer_outline(&report(), &InferenceConfig::default()).unwrap();
        let sequential = infer_outline(&report(), &InferenceConfig::default().sequential()).unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_no_runs_gives_empty_outline() {
        let outline = infer_outline(&[], &InferenceConfig::default()).unwrap();
        assert!(outline.is_empty());
    }

    #[test]
    fn test_missing_first_page_has_no_title() {
        let runs: Vec<TextRun> = report().into_iter().filter(|r| r.page != 1).collect();
        let outline = infer_outline(&runs, &InferenceConfig::default()).unwrap();
        assert!(outline.title.is_none());
        assert_eq!(outline.headings.len(), 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = InferenceConfig::default().with_repeat_min_pages(0);
        assert!(infer_outline(&report(), &config).is_err());
    }

    #[test]
    fn test_custom_rule_set() {
        fn reject_numbered(line: &Line, _ctx: &RuleContext<'_>) -> bool {
            rules::numbering_depth(&line.text).is_some()
        }

        let engine = OutlineEngine::new(InferenceConfig::default())
            .with_rules(RuleSet::standard().with_rejection_rule("numbered", reject_numbered));
        let outline = engine.infer(&report()).unwrap();
        assert!(outline.headings.is_empty());
        assert_eq!(outline.title_text(), Some("Annual Report"));
    }

    #[test]
    fn test_diagnose_marks_title_and_acceptance() {
        let diagnostics = OutlineEngine::new(InferenceConfig::default())
            .diagnose(&report())
            .unwrap();

        assert_eq!(diagnostics.lines.len(), 6);
        assert!(diagnostics.lines[0].in_title);
        let intro = diagnostics
            .lines
            .iter()
            .find(|d| d.line.text == "1. Introduction")
            .unwrap();
        assert!(intro.accepted);
        assert!(diagnostics
            .lines
            .iter()
            .filter(|d| d.line.text == BODY)
            .all(|d| !d.accepted));
        assert!((diagnostics.profile.baseline - 11.0).abs() < 0.01);
    }

    #[test]
    fn test_title_lines_match_by_position() {
        let config = InferenceConfig::default();
        let page_one = aggregate_lines(
            &[
                run("Regional Water", 24.0, true, 1, 60.0),
                run("Plan", 24.0, true, 1, 90.0),
                run(BODY, 12.0, false, 1, 140.0),
                run("Plan", 12.0, true, 1, 170.0),
            ],
            &config,
        );
        let title = detect_title(&page_one, &config);
        assert_eq!(title.as_ref().map(|t| t.title.text.as_str()), Some("Regional Water Plan"));

        let in_title: Vec<bool> = page_one
            .iter()
            .map(|l| is_title_line(l, title.as_ref(), &page_one))
            .collect();
        assert_eq!(in_title, vec![true, true, false, false]);
    }
}
