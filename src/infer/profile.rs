//! Document-wide font statistics.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::Line;

use super::config::InferenceConfig;

/// Body size assumed when a document has no text at all.
const DEFAULT_BODY_SIZE: f32 = 12.0;

/// A distinct heading-eligible font size and its rank (0 = largest).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleCluster {
    pub size: f32,
    pub rank: usize,
}

/// Font statistics for one document.
///
/// Built once in the first pass and shared read-only by every page in the
/// second pass.
#[derive(Debug, Clone)]
pub struct StyleProfile {
    /// Body text size (highest character-weighted frequency)
    pub baseline: f32,
    /// Whether body text is predominantly bold
    pub body_bold: bool,
    /// Heading-eligible sizes, largest first, ranks 0..k-1
    pub clusters: Vec<StyleCluster>,
    /// Character weight per quantized size
    pub histogram: BTreeMap<i64, usize>,
    quantum: f32,
    noise_margin: f32,
}

impl StyleProfile {
    /// Build the histogram and clusters from every line of the document.
    pub fn build<'a, I>(lines: I, config: &InferenceConfig) -> Self
    where
        I: IntoIterator<Item = &'a Line>,
    {
        let quantum = config.size_quantum;
        let mut histogram: BTreeMap<i64, usize> = BTreeMap::new();
        let mut weight_by_bold: BTreeMap<i64, (usize, usize)> = BTreeMap::new();

        for line in lines {
            let chars = line.char_count();
            if chars == 0 {
                continue;
            }
            let key = quantize(line.font_size, quantum);
            *histogram.entry(key).or_insert(0) += chars;
            let entry = weight_by_bold.entry(key).or_insert((0, 0));
            if line.bold {
                entry.0 += chars;
            } else {
                entry.1 += chars;
            }
        }

        // Ties go to the smaller size: BTreeMap iterates ascending and
        // max_by_key keeps the last maximum, so iterate in reverse.
        let body_key = histogram
            .iter()
            .rev()
            .max_by_key(|(_, weight)| **weight)
            .map(|(key, _)| *key);

        let Some(body_key) = body_key else {
            return Self {
                baseline: DEFAULT_BODY_SIZE,
                body_bold: false,
                clusters: vec![],
                histogram,
                quantum,
                noise_margin: config.baseline_noise_margin,
            };
        };

        let baseline = dequantize(body_key, quantum);
        let body_bold = weight_by_bold
            .get(&body_key)
            .map(|(bold, regular)| bold > regular)
            .unwrap_or(false);

        let mut clusters: Vec<StyleCluster> = histogram
            .keys()
            .rev()
            .map(|k| dequantize(*k, quantum))
            .filter(|size| *size > baseline + config.baseline_noise_margin)
            .enumerate()
            .map(|(rank, size)| StyleCluster { size, rank })
            .collect();

        if clusters.is_empty() {
            // Single-style documents still get one cluster so that later
            // stages never index into an empty list.
            clusters.push(StyleCluster {
                size: baseline,
                rank: 0,
            });
        }

        log::debug!(
            "Style profile: baseline={:.1}pt body_bold={} clusters={:?}",
            baseline,
            body_bold,
            clusters.iter().map(|c| c.size).collect::<Vec<_>>()
        );

        Self {
            baseline,
            body_bold,
            clusters,
            histogram,
            quantum,
            noise_margin: config.baseline_noise_margin,
        }
    }

    /// Whether a size is strictly above the baseline plus the noise margin.
    pub fn is_heading_size(&self, size: f32) -> bool {
        size > self.baseline + self.noise_margin
    }

    /// Rank of the cluster a heading-eligible size belongs to.
    ///
    /// Returns `None` for sizes at or below the baseline.
    pub fn cluster_rank(&self, size: f32) -> Option<usize> {
        if !self.is_heading_size(size) {
            return None;
        }
        let key = quantize(size, self.quantum);
        self.clusters
            .iter()
            .find(|c| quantize(c.size, self.quantum) <= key)
            .or(self.clusters.last())
            .map(|c| c.rank)
    }

    /// Rank given to headings that qualified without a larger size.
    pub fn bold_only_rank(&self) -> usize {
        self.clusters.last().map(|c| c.rank + 1).unwrap_or(0)
    }

    /// Whether the document uses more than one font size.
    pub fn has_size_variation(&self) -> bool {
        self.histogram.len() >= 2
    }

    /// Check that ranks are contiguous from 0 and sizes strictly descending.
    pub fn validate(&self) -> Result<()> {
        for (i, cluster) in self.clusters.iter().enumerate() {
            if cluster.rank != i {
                return Err(Error::InvariantViolation(format!(
                    "cluster ranks are not contiguous: position {} has rank {}",
                    i, cluster.rank
                )));
            }
        }
        if self.clusters.windows(2).any(|w| w[0].size <= w[1].size) {
            return Err(Error::InvariantViolation(
                "cluster sizes are not strictly descending".to_string(),
            ));
        }
        Ok(())
    }
}

fn quantize(size: f32, quantum: f32) -> i64 {
    (size / quantum).round() as i64
}

fn dequantize(key: i64, quantum: f32) -> f32 {
    key as f32 * quantum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, TextRun};

    fn line(text: &str, size: f32, bold: bool) -> Line {
        Line::from_runs(vec![TextRun::new(
            text,
            "Helvetica",
            size,
            bold,
            BBox::new(72.0, 100.0, 300.0, 100.0 + size),
            1,
        )])
    }

    fn body(size: f32) -> Line {
        line(
            "Body text that appears many times across the document pages.",
            size,
            false,
        )
    }

    #[test]
    fn test_baseline_is_character_weighted() {
        let config = InferenceConfig::default();
        // Many short 18pt lines, one long 11pt paragraph with more characters
        let lines = vec![
            line("A", 18.0, false),
            line("B", 18.0, false),
            line("C", 18.0, false),
            body(11.0),
        ];
        let profile = StyleProfile::build(&lines, &config);
        assert!((profile.baseline - 11.0).abs() < 0.01);
    }

    #[test]
    fn test_clusters_ranked_descending() {
        let config = InferenceConfig::default();
        let lines = vec![
            body(12.0),
            body(12.0),
            line("Chapter", 24.0, true),
            line("Section", 18.0, true),
            line("Subsection", 14.0, true),
            line("Noise", 12.3, false),
            line("Footnote", 9.0, false),
        ];
        let profile = StyleProfile::build(&lines, &config);

        let sizes: Vec<f32> = profile.clusters.iter().map(|c| c.size.round()).collect();
        assert_eq!(sizes, vec![24.0, 18.0, 14.0]);
        assert!(profile.validate().is_ok());

        assert_eq!(profile.cluster_rank(24.0), Some(0));
        assert_eq!(profile.cluster_rank(18.0), Some(1));
        assert_eq!(profile.cluster_rank(14.0), Some(2));
        assert_eq!(profile.cluster_rank(12.3), None);
        assert_eq!(profile.cluster_rank(9.0), None);
        assert_eq!(profile.bold_only_rank(), 3);
    }

    #[test]
    fn test_single_size_still_has_one_cluster() {
        let config = InferenceConfig::default();
        let lines = vec![body(11.0), line("Also body", 11.0, false)];
        let profile = StyleProfile::build(&lines, &config);

        assert_eq!(profile.clusters.len(), 1);
        assert_eq!(profile.clusters[0].rank, 0);
        assert!(!profile.has_size_variation());
        assert!(!profile.is_heading_size(11.0));
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn test_empty_document_profile() {
        let config = InferenceConfig::default();
        let profile = StyleProfile::build(std::iter::empty(), &config);
        assert_eq!(profile.baseline, DEFAULT_BODY_SIZE);
        assert!(profile.clusters.is_empty());
        assert_eq!(profile.bold_only_rank(), 0);
    }

    #[test]
    fn test_body_bold_detection() {
        let config = InferenceConfig::default();
        let lines = vec![line("All of this body text is set in bold", 10.0, true)];
        let profile = StyleProfile::build(&lines, &config);
        assert!(profile.body_bold);
    }

    #[test]
    fn test_validate_detects_gaps() {
        let config = InferenceConfig::default();
        let mut profile = StyleProfile::build(&[body(12.0), line("Big", 20.0, false)], &config);
        profile.clusters.push(StyleCluster {
            size: 14.0,
            rank: 3,
        });
        assert!(matches!(
            profile.validate(),
            Err(Error::InvariantViolation(_))
        ));
    }
}
