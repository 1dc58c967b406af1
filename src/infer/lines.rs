//! Line aggregation: merging runs on a shared baseline into lines.

use crate::model::{Line, TextRun};

use super::config::InferenceConfig;

/// Group one page's runs into lines in reading order.
///
/// Runs whose baselines fall within `line_tolerance_ratio` times the smaller
/// of the two font sizes are merged. Lines come out top to bottom; runs inside
/// a line left to right.
pub fn aggregate_lines(runs: &[TextRun], config: &InferenceConfig) -> Vec<Line> {
    let mut runs: Vec<&TextRun> = runs.iter().filter(|r| !r.text.trim().is_empty()).collect();
    if runs.is_empty() {
        return vec![];
    }

    runs.sort_by(|a, b| {
        a.baseline()
            .total_cmp(&b.baseline())
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<TextRun> = Vec::new();
    let mut anchor = 0.0_f32;
    let mut min_size = f32::MAX;

    for run in runs {
        if !current.is_empty() {
            let tolerance = run.font_size.min(min_size) * config.line_tolerance_ratio;
            if (run.baseline() - anchor).abs() <= tolerance {
                min_size = min_size.min(run.font_size);
                current.push(run.clone());
                continue;
            }
            lines.push(Line::from_runs(std::mem::take(&mut current)));
        }

        anchor = run.baseline();
        min_size = run.font_size;
        current.push(run.clone());
    }

    if !current.is_empty() {
        lines.push(Line::from_runs(current));
    }

    lines.retain(|l| !l.text.is_empty());
    lines.sort_by(|a, b| a.y().total_cmp(&b.y()).then(a.bbox.x0.total_cmp(&b.bbox.x0)));

    log::debug!(
        "Aggregated {} lines on page {}",
        lines.len(),
        lines.first().map(|l| l.page).unwrap_or(0)
    );

    lines
}
