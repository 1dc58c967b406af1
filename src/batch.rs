//! Directory batch processing: one outline JSON per input PDF.
//!
//! Documents are independent: a document that cannot be extracted is
//! skipped, one that trips an internal invariant is marked failed, and
//! neither stops the rest of the batch.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::detect::has_pdf_extension;
use crate::error::{Error, Result};
use crate::extract::{ExtractOptions, PdfRunExtractor};
use crate::infer::{InferenceConfig, OutlineEngine};
use crate::model::Outline;
use crate::render::{to_json, JsonFormat};

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Inference configuration shared by every document
    pub config: InferenceConfig,
    /// JSON layout of the output files
    pub json_format: JsonFormat,
    /// Process documents in parallel
    pub parallel: bool,
}

impl BatchOptions {
    /// Create batch options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inference configuration.
    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the JSON output layout.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Process one document at a time.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self.config = self.config.sequential();
        self
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            config: InferenceConfig::default(),
            json_format: JsonFormat::Pretty,
            parallel: true,
        }
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileStatus {
    /// Outline written
    Processed { headings: usize, has_title: bool },
    /// The PDF could not be read; nothing written
    Skipped(String),
    /// Processing aborted on an internal error; nothing written
    Failed(String),
}

/// Result for one input file.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Path of the written outline, if any
    pub output: Option<PathBuf>,
    pub status: FileStatus,
}

impl FileOutcome {
    /// Whether an outline was written.
    pub fn is_processed(&self) -> bool {
        matches!(self.status, FileStatus::Processed { .. })
    }
}

/// Per-file outcomes of a batch run, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    /// Number of outlines written.
    pub fn processed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_processed()).count()
    }

    /// Number of unreadable documents.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FileStatus::Skipped(_)))
            .count()
    }

    /// Number of documents that failed on an internal error.
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, FileStatus::Failed(_)))
            .count()
    }
}

/// List the PDF files directly inside a directory, sorted by path.
pub fn collect_inputs<P: AsRef<Path>>(input_dir: P) -> Result<Vec<PathBuf>> {
    let input_dir = input_dir.as_ref();
    let mut inputs = Vec::new();
    for entry in fs::read_dir(input_dir)? {
        let path = entry?.path();
        if path.is_file() && has_pdf_extension(&path) {
            inputs.push(path);
        }
    }
    inputs.sort();

    if inputs.is_empty() {
        return Err(Error::NoInputFiles(input_dir.to_path_buf()));
    }
    Ok(inputs)
}

/// Output path for an input: `<output_dir>/<input stem>.json`.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}.json", stem))
}

/// Extract and infer the outline of one PDF file.
///
/// Unreadable pages are skipped rather than failing the document.
pub fn outline_for_file(path: &Path, config: &InferenceConfig) -> Result<Outline> {
    let extractor = PdfRunExtractor::open_with_options(path, ExtractOptions::new().lenient())?;
    let runs = extractor.extract_runs()?;
    OutlineEngine::new(config.clone()).infer(&runs)
}

/// Process every PDF in `input_dir`, writing outlines to `output_dir`.
pub fn run_batch<P: AsRef<Path>, Q: AsRef<Path>>(
    input_dir: P,
    output_dir: Q,
    options: &BatchOptions,
) -> Result<BatchReport> {
    run_batch_with_progress(input_dir, output_dir, options, |_| {})
}

/// Like [`run_batch`], calling `on_done` as each file finishes.
pub fn run_batch_with_progress<P, Q, F>(
    input_dir: P,
    output_dir: Q,
    options: &BatchOptions,
    on_done: F,
) -> Result<BatchReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: Fn(&FileOutcome) + Sync,
{
    options.config.validate()?;
    let inputs = collect_inputs(input_dir)?;
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir)?;

    log::info!(
        "Processing {} PDF files into {}",
        inputs.len(),
        output_dir.display()
    );

    let process = |input: &PathBuf| {
        let outcome = process_one(input, output_dir, options);
        on_done(&outcome);
        outcome
    };

    let outcomes: Vec<FileOutcome> = if options.parallel {
        inputs.par_iter().map(process).collect()
    } else {
        inputs.iter().map(process).collect()
    };

    let report = BatchReport { outcomes };
    log::info!(
        "Batch finished: {} processed, {} skipped, {} failed",
        report.processed(),
        report.skipped(),
        report.failed()
    );
    Ok(report)
}

fn process_one(input: &Path, output_dir: &Path, options: &BatchOptions) -> FileOutcome {
    let result = outline_for_file(input, &options.config).and_then(|outline| {
        let output = output_path(input, output_dir);
        let json = to_json(&outline, options.json_format)?;
        fs::write(&output, json)?;
        Ok((outline, output))
    });

    match result {
        Ok((outline, output)) => {
            log::info!(
                "{}: {} headings{}",
                input.display(),
                outline.headings.len(),
                if outline.title.is_some() { ", titled" } else { "" }
            );
            FileOutcome {
                input: input.to_path_buf(),
                output: Some(output),
                status: FileStatus::Processed {
                    headings: outline.headings.len(),
                    has_title: outline.title.is_some(),
                },
            }
        }
        Err(e) if e.is_extraction_failure() => {
            log::warn!("Skipping {}: {}", input.display(), e);
            FileOutcome {
                input: input.to_path_buf(),
                output: None,
                status: FileStatus::Skipped(e.to_string()),
            }
        }
        Err(e) => {
            log::warn!("Failed {}: {}", input.display(), e);
            FileOutcome {
                input: input.to_path_buf(),
                output: None,
                status: FileStatus::Failed(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_uses_stem() {
        let path = output_path(Path::new("/in/report.final.PDF"), Path::new("/out"));
        assert_eq!(path, PathBuf::from("/out/report.final.json"));
    }

    #[test]
    fn test_collect_inputs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.pdf"), b"%PDF-1.4").unwrap();
        fs::write(dir.path().join("a.PDF"), b"%PDF-1.4").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let inputs = collect_inputs(dir.path()).unwrap();
        let names: Vec<String> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.PDF", "b.pdf"]);
    }

    #[test]
    fn test_collect_inputs_empty_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            collect_inputs(dir.path()),
            Err(Error::NoInputFiles(_))
        ));
    }

    #[test]
    fn test_report_counts() {
        let outcome = |status| FileOutcome {
            input: PathBuf::from("x.pdf"),
            output: None,
            status,
        };
        let report = BatchReport {
            outcomes: vec![
                outcome(FileStatus::Processed {
                    headings: 2,
                    has_title: true,
                }),
                outcome(FileStatus::Skipped("encrypted".into())),
                outcome(FileStatus::Failed("bug".into())),
                outcome(FileStatus::Skipped("garbage".into())),
            ],
        };
        assert_eq!(report.processed(), 1);
        assert_eq!(report.skipped(), 2);
        assert_eq!(report.failed(), 1);
    }
}
