//! Outline assembly and final structural checks.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::model::{Heading, Outline};

use super::levels::LeveledCandidate;
use super::title::TitleSelection;

/// Pair the title with the leveled candidates, ordered by page then
/// vertical position.
///
/// Fails with [`Error::InvariantViolation`] if a position cannot be ordered
/// or a heading repeats the title text; both indicate a defect upstream.
pub fn build_outline(
    title: Option<TitleSelection>,
    leveled: Vec<LeveledCandidate>,
) -> Result<Outline> {
    let mut headings: Vec<Heading> = leveled
        .into_iter()
        .map(|c| Heading {
            level: c.level,
            text: c.candidate.line.text.clone(),
            page: c.candidate.line.page,
            y: c.candidate.line.y(),
        })
        .collect();

    if let Some(bad) = headings.iter().find(|h| h.y.is_nan()) {
        return Err(Error::InvariantViolation(format!(
            "heading {:?} on page {} has no vertical position",
            bad.text, bad.page
        )));
    }

    // Stable: lines sharing a position keep reading order
    headings.sort_by(|a, b| a.page.cmp(&b.page).then(a.y.total_cmp(&b.y)));
    validate_order(&headings)?;

    let title = title.map(|selection| selection.title);
    if let Some(title) = &title {
        if let Some(dup) = headings.iter().find(|h| h.text == title.text) {
            return Err(Error::InvariantViolation(format!(
                "title {:?} also emitted as a heading on page {}",
                title.text, dup.page
            )));
        }
    }

    log::debug!(
        "Outline: title={:?}, {} headings",
        title.as_ref().map(|t| t.text.as_str()),
        headings.len()
    );

    Ok(Outline { title, headings })
}

fn validate_order(headings: &[Heading]) -> Result<()> {
    for pair in headings.windows(2) {
        let ordered = match pair[0].page.cmp(&pair[1].page) {
            Ordering::Less => true,
            Ordering::Equal => pair[0].y <= pair[1].y,
            Ordering::Greater => false,
        };
        if !ordered {
            return Err(Error::InvariantViolation(format!(
                "headings out of order: {:?} (page {}) before {:?} (page {})",
                pair[0].text, pair[0].page, pair[1].text, pair[1].page
            )));
        }
    }
    Ok(())
}
