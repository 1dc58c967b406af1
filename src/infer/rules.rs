//! Heading rules: named scoring signals and named rejection predicates.
//!
//! Every rule is a pure function of one line plus the read-only document
//! tables, so each can be tested on its own and new rules can be added to a
//! [`RuleSet`] without touching the pipeline.

use std::sync::LazyLock;

use regex::{Regex, RegexSet};

use crate::model::Line;

use super::config::InferenceConfig;
use super::profile::StyleProfile;
use super::repeated::RepeatedLineIndex;

static NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)\.?\s").expect("valid numbering regex"));

static KEYWORD_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(chapter|section|appendix)\b").expect("valid keyword regex")
});

static BOILERPLATE: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"^\d+$",
        r"(?i)^page\s+\d+(\s+of\s+\d+)?$",
        r"(?i)^[ivxlcdm]+$",
        r"(?i)^[a-z]$",
        r"^\d{1,2}/\d{1,2}/\d{2,4}$",
        r"^\d{4}-\d{2}-\d{2}$",
    ])
    .expect("valid boilerplate regexes")
});

/// Depth of a leading numbering scheme: "2.1.3 Scope" → 3.
pub fn numbering_depth(text: &str) -> Option<usize> {
    NUMBERING
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().split('.').count())
}

/// Whether the text starts with Chapter, Section or Appendix.
pub fn has_keyword_prefix(text: &str) -> bool {
    KEYWORD_PREFIX.is_match(text)
}

/// Whether the whole text is a page number, roman numeral, lone letter or date.
pub fn is_boilerplate(text: &str) -> bool {
    BOILERPLATE.is_match(text.trim())
}

/// Per-page layout statistics used by the local rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageStats {
    /// Average words per line (document average for near-empty pages)
    pub avg_words: f32,
    /// Leftmost text edge on the page
    pub left: f32,
    /// Rightmost text edge on the page
    pub right: f32,
}

impl PageStats {
    /// Compute statistics for one page's lines.
    ///
    /// Pages with fewer than two lines have no meaningful average of their
    /// own; `fallback_avg_words` is used instead.
    pub fn compute(lines: &[Line], fallback_avg_words: f32) -> Self {
        let avg_words = if lines.len() >= 2 {
            lines.iter().map(|l| l.word_count()).sum::<usize>() as f32 / lines.len() as f32
        } else {
            fallback_avg_words
        };
        let left = lines.iter().map(|l| l.bbox.x0).fold(f32::MAX, f32::min);
        let right = lines.iter().map(|l| l.bbox.x1).fold(f32::MIN, f32::max);

        Self {
            avg_words,
            left,
            right,
        }
    }

    /// Horizontal extent of the page's text.
    pub fn extent(&self) -> f32 {
        (self.right - self.left).max(0.0)
    }
}

/// Read-only tables a rule may consult.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub profile: &'a StyleProfile,
    pub repeated: &'a RepeatedLineIndex,
    pub page: &'a PageStats,
    pub config: &'a InferenceConfig,
}

impl RuleContext<'_> {
    /// Bold only counts as a signal when body text is not itself bold.
    pub fn is_distinct_bold(&self, line: &Line) -> bool {
        line.bold && !self.profile.body_bold
    }
}

/// A scoring function: evidence contributed by one signal.
pub type ScoreFn = fn(&Line, &RuleContext<'_>) -> f32;

/// A rejection predicate: `true` vetoes the line regardless of score.
pub type RejectFn = fn(&Line, &RuleContext<'_>) -> bool;

/// A named scoring signal.
#[derive(Clone, Copy)]
pub struct ScoringRule {
    pub name: &'static str,
    pub score: ScoreFn,
}

/// A named rejection predicate.
#[derive(Clone, Copy)]
pub struct RejectionRule {
    pub name: &'static str,
    pub rejects: RejectFn,
}

/// Outcome of running a rule set over one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Total evidence score
    pub score: f32,
    /// Non-zero contributions by rule name
    pub signals: Vec<(&'static str, f32)>,
    /// First rejection rule that fired
    pub rejected_by: Option<&'static str>,
}

impl Evaluation {
    /// Whether the line survives every veto and reaches the threshold.
    pub fn is_accepted(&self, threshold: f32) -> bool {
        self.rejected_by.is_none() && self.score >= threshold
    }
}

/// Ordered scoring and rejection rules.
#[derive(Clone)]
pub struct RuleSet {
    scoring: Vec<ScoringRule>,
    rejection: Vec<RejectionRule>,
}

impl RuleSet {
    /// An empty rule set.
    pub fn empty() -> Self {
        Self {
            scoring: vec![],
            rejection: vec![],
        }
    }

    /// The standard heading rules.
    pub fn standard() -> Self {
        Self::empty()
            .with_scoring_rule("size", score_size)
            .with_scoring_rule("bold", score_bold)
            .with_scoring_rule("casing", score_casing)
            .with_scoring_rule("short_line", score_short_line)
            .with_scoring_rule("numbering", score_numbering)
            .with_scoring_rule("keyword", score_keyword)
            .with_scoring_rule("unterminated", score_unterminated)
            .with_scoring_rule("centered", score_centered)
            .with_rejection_rule("empty", reject_empty)
            .with_rejection_rule("boilerplate", reject_boilerplate)
            .with_rejection_rule("body_paragraph", reject_body_paragraph)
            .with_rejection_rule("too_long", reject_too_long)
            .with_rejection_rule("single_size", reject_single_size)
            .with_rejection_rule("body_style", reject_body_style)
            .with_rejection_rule("running_header", reject_running_header)
    }

    /// Append a scoring rule.
    pub fn with_scoring_rule(mut self, name: &'static str, score: ScoreFn) -> Self {
        self.scoring.push(ScoringRule { name, score });
        self
    }

    /// Append a rejection rule.
    pub fn with_rejection_rule(mut self, name: &'static str, rejects: RejectFn) -> Self {
        self.rejection.push(RejectionRule { name, rejects });
        self
    }

    /// Remove every rule with the given name.
    pub fn without_rule(mut self, name: &str) -> Self {
        self.scoring.retain(|r| r.name != name);
        self.rejection.retain(|r| r.name != name);
        self
    }

    /// Names of all rules, scoring first.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.scoring
            .iter()
            .map(|r| r.name)
            .chain(self.rejection.iter().map(|r| r.name))
            .collect()
    }

    /// Score a line and check it against every rejection predicate.
    pub fn evaluate(&self, line: &Line, ctx: &RuleContext<'_>) -> Evaluation {
        let signals: Vec<(&'static str, f32)> = self
            .scoring
            .iter()
            .map(|r| (r.name, (r.score)(line, ctx)))
            .filter(|(_, s)| *s != 0.0)
            .collect();
        let score = signals.iter().map(|(_, s)| s).sum();
        let rejected_by = self
            .rejection
            .iter()
            .find(|r| (r.rejects)(line, ctx))
            .map(|r| r.name);

        Evaluation {
            score,
            signals,
            rejected_by,
        }
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("scoring", &self.scoring.iter().map(|r| r.name).collect::<Vec<_>>())
            .field(
                "rejection",
                &self.rejection.iter().map(|r| r.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ==================== Scoring rules ====================

fn score_size(line: &Line, ctx: &RuleContext<'_>) -> f32 {
    if !ctx.profile.is_heading_size(line.font_size) {
        return 0.0;
    }
    ((line.font_size - ctx.profile.baseline) * ctx.config.size_weight).min(ctx.config.size_score_cap)
}

fn score_bold(line: &Line, ctx: &RuleContext<'_>) -> f32 {
    if ctx.is_distinct_bold(line) {
        ctx.config.bold_weight
    } else {
        0.0
    }
}

fn score_casing(line: &Line, ctx: &RuleContext<'_>) -> f32 {
    if line.is_uppercase() || line.is_title_case() {
        ctx.config.casing_weight
    } else {
        0.0
    }
}

fn score_short_line(line: &Line, ctx: &RuleContext<'_>) -> f32 {
    if (line.word_count() as f32) < ctx.page.avg_words * ctx.config.short_line_ratio {
        ctx.config.short_line_weight
    } else {
        0.0
    }
}

fn score_numbering(line: &Line, ctx: &RuleContext<'_>) -> f32 {
    if numbering_depth(&line.text).is_some() {
        ctx.config.numbering_weight
    } else {
        0.0
    }
}

fn score_keyword(line: &Line, ctx: &RuleContext<'_>) -> f32 {
    if has_keyword_prefix(&line.text) {
        ctx.config.keyword_weight
    } else {
        0.0
    }
}

fn score_unterminated(line: &Line, ctx: &RuleContext<'_>) -> f32 {
    if line.ends_with_terminal_punctuation() {
        0.0
    } else {
        ctx.config.unterminated_weight
    }
}

fn score_centered(line: &Line, ctx: &RuleContext<'_>) -> f32 {
    let extent = ctx.page.extent();
    if extent <= 0.0 || line.bbox.width() >= extent * 0.8 {
        return 0.0;
    }
    let left_margin = line.bbox.x0 - ctx.page.left;
    let right_margin = ctx.page.right - line.bbox.x1;
    if (left_margin - right_margin).abs() < ctx.config.centered_tolerance {
        ctx.config.centered_weight
    } else {
        0.0
    }
}

// ==================== Rejection rules ====================

fn reject_empty(line: &Line, _ctx: &RuleContext<'_>) -> bool {
    line.is_blank_or_punctuation()
}

fn reject_boilerplate(line: &Line, _ctx: &RuleContext<'_>) -> bool {
    is_boilerplate(&line.text)
}

fn reject_body_paragraph(line: &Line, ctx: &RuleContext<'_>) -> bool {
    line.ends_with_terminal_punctuation() && line.word_count() > ctx.config.long_line_words
}

fn reject_too_long(line: &Line, ctx: &RuleContext<'_>) -> bool {
    line.word_count() > ctx.config.max_heading_words
}

/// Without any size variation there is no style hierarchy to recover.
fn reject_single_size(line: &Line, ctx: &RuleContext<'_>) -> bool {
    !ctx.profile.has_size_variation() && !ctx.profile.is_heading_size(line.font_size)
}

fn reject_body_style(line: &Line, ctx: &RuleContext<'_>) -> bool {
    !ctx.profile.is_heading_size(line.font_size)
        && !ctx.is_distinct_bold(line)
        && numbering_depth(&line.text).is_none()
        && !has_keyword_prefix(&line.text)
}

fn reject_running_header(line: &Line, ctx: &RuleContext<'_>) -> bool {
    ctx.repeated.is_repeated(line)
}
