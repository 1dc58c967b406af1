//! Heading candidate detection.

use crate::model::Line;

use super::rules::{numbering_depth, RuleContext, RuleSet};

/// A line that passed every rejection rule and reached the score threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    pub line: Line,
    pub score: f32,
    /// Rank of the line's size cluster; lines at or below the body size get
    /// the rank after the smallest cluster
    pub cluster_rank: usize,
    /// Depth of a leading numbering scheme, if any
    pub numbering_depth: Option<usize>,
}

impl HeadingCandidate {
    /// Build a candidate, tagging it with its cluster rank.
    pub fn new(line: Line, score: f32, ctx: &RuleContext<'_>) -> Self {
        let cluster_rank = ctx
            .profile
            .cluster_rank(line.font_size)
            .unwrap_or_else(|| ctx.profile.bold_only_rank());
        let numbering_depth = numbering_depth(&line.text);

        Self {
            line,
            score,
            cluster_rank,
            numbering_depth,
        }
    }
}

/// Score one page's lines and keep the accepted ones, in order.
pub fn detect_candidates(
    lines: &[Line],
    ctx: &RuleContext<'_>,
    rules: &RuleSet,
) -> Vec<HeadingCandidate> {
    lines
        .iter()
        .filter_map(|line| {
            let eval = rules.evaluate(line, ctx);
            if let Some(rule) = eval.rejected_by {
                log::trace!("Rejected {:?} (rule: {})", line.text, rule);
                return None;
            }
            if eval.score < ctx.config.score_threshold {
                log::trace!("Below threshold {:?} (score: {:.2})", line.text, eval.score);
                return None;
            }
            log::debug!(
                "Candidate on page {}: {:?} (score: {:.2})",
                line.page,
                line.text,
                eval.score
            );
            Some(HeadingCandidate::new(line.clone(), eval.score, ctx))
        })
        .collect()
}
