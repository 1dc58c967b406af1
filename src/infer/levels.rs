//! Level assignment: cluster rank to H1..H6.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};
use crate::model::HeadingLevel;

use super::candidates::HeadingCandidate;

/// A candidate together with its final level.
#[derive(Debug, Clone, PartialEq)]
pub struct LeveledCandidate {
    pub candidate: HeadingCandidate,
    pub level: HeadingLevel,
}

/// Per-rank facts used for refinement.
#[derive(Debug, Default)]
struct RankGroup {
    min_numbering_depth: Option<usize>,
    has_bold: bool,
    has_regular: bool,
}

/// Assign levels to candidates, keeping their order.
///
/// Ranks actually used are compacted to `0..n` first, so a document whose
/// only headings sit in the second-largest size still starts at H1. Size rank
/// is the primary signal. Inside one rank a candidate may sink exactly one
/// level when its numbering is deeper than its peers' ("2.1" among "2") or
/// when it is set regular among bold peers. It is never raised.
pub fn assign_levels(candidates: Vec<HeadingCandidate>) -> Result<Vec<LeveledCandidate>> {
    // Enumerating the sorted set makes the dense ranks contiguous.
    let used: BTreeSet<usize> = candidates.iter().map(|c| c.cluster_rank).collect();
    let compact: BTreeMap<usize, usize> = used
        .iter()
        .enumerate()
        .map(|(dense, rank)| (*rank, dense))
        .collect();

    let mut groups: BTreeMap<usize, RankGroup> = BTreeMap::new();
    for candidate in &candidates {
        let group = groups.entry(candidate.cluster_rank).or_default();
        if let Some(depth) = candidate.numbering_depth {
            group.min_numbering_depth = Some(
                group
                    .min_numbering_depth
                    .map_or(depth, |current| current.min(depth)),
            );
        }
        if candidate.line.bold {
            group.has_bold = true;
        } else {
            group.has_regular = true;
        }
    }

    candidates
        .into_iter()
        .map(|candidate| {
            let dense = compact.get(&candidate.cluster_rank).copied().ok_or_else(|| {
                Error::InvariantViolation(format!(
                    "cluster rank {} missing from compaction table",
                    candidate.cluster_rank
                ))
            })?;
            let group = groups.get(&candidate.cluster_rank);

            let deeper_numbering = match (candidate.numbering_depth, group) {
                (Some(depth), Some(g)) => g.min_numbering_depth.is_some_and(|min| depth > min),
                _ => false,
            };
            let regular_among_bold = !candidate.line.bold
                && group.is_some_and(|g| g.has_bold && g.has_regular);

            let mut level = HeadingLevel::from_rank(dense);
            if deeper_numbering || regular_among_bold {
                level = level.deeper();
            }

            log::debug!(
                "Level {} for {:?} (rank {} -> {})",
                level,
                candidate.line.text,
                candidate.cluster_rank,
                dense
            );

            Ok(LeveledCandidate { candidate, level })
        })
        .collect()
}
