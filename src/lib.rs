//! # pdfoutline
//!
//! Title and heading outline inference for PDF documents without bookmarks.
//!
//! Text runs are pulled from each page with their font size, weight and
//! position. A two-pass heuristic pipeline then decides which line is the
//! title, which lines are headings, and what level (H1 to H6) each heading
//! sits at.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfoutline::{extract_outline, render};
//!
//! fn main() -> pdfoutline::Result<()> {
//!     let outline = extract_outline("document.pdf")?;
//!     println!("{}", render::to_json(&outline, render::JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Style profiling**: body size from a character-weighted size histogram
//! - **Rule engine**: named scoring signals and rejection rules, each testable alone
//! - **Running header detection**: cross-page index of recurring lines
//! - **Parallel processing**: Rayon fan-out over pages and over batch inputs
//! - **Calibration**: every tuned constant lives in [`InferenceConfig`]

pub mod batch;
pub mod detect;
pub mod error;
pub mod extract;
pub mod infer;
pub mod model;
pub mod render;

// Re-export commonly used types
pub use batch::{run_batch, BatchOptions, BatchReport, FileOutcome, FileStatus};
pub use detect::{has_pdf_extension, sniff_bytes, sniff_file, PdfHeader};
pub use error::{Error, Result};
pub use extract::{ErrorMode, ExtractOptions, PageSelection, PdfRunExtractor};
pub use infer::{infer_outline, InferenceConfig, OutlineEngine, RuleSet};
pub use model::{BBox, Heading, HeadingLevel, Line, Outline, TextRun, Title};
pub use render::{JsonFormat, OutputFormat};

use std::path::Path;

/// Infer the outline of a PDF file with default settings.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline;
///
/// let outline = extract_outline("document.pdf").unwrap();
/// for heading in &outline.headings {
///     println!("{} {} (page {})", heading.level, heading.text, heading.page);
/// }
/// ```
pub fn extract_outline<P: AsRef<Path>>(path: P) -> Result<Outline> {
    PdfOutline::new().outline(path)
}

/// Infer the outline of a PDF file with a custom configuration.
pub fn extract_outline_with_config<P: AsRef<Path>>(
    path: P,
    config: InferenceConfig,
) -> Result<Outline> {
    PdfOutline::new().with_config(config).outline(path)
}

/// Infer the outline of a PDF held in memory.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::extract_outline_from_bytes;
///
/// let data = std::fs::read("document.pdf").unwrap();
/// let outline = extract_outline_from_bytes(&data).unwrap();
/// ```
pub fn extract_outline_from_bytes(data: &[u8]) -> Result<Outline> {
    PdfOutline::new().outline_bytes(data)
}

/// Builder for extracting outlines from PDF documents.
///
/// # Example
///
/// ```no_run
/// use pdfoutline::{InferenceConfig, PdfOutline};
///
/// let outline = PdfOutline::new()
///     .lenient()
///     .with_config(InferenceConfig::default().with_score_threshold(3.5))
///     .outline("document.pdf")?;
/// # Ok::<(), pdfoutline::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct PdfOutline {
    extract_options: ExtractOptions,
    config: InferenceConfig,
    rules: RuleSet,
}

impl PdfOutline {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip pages whose content cannot be decoded.
    pub fn lenient(mut self) -> Self {
        self.extract_options = self.extract_options.lenient();
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.config = self.config.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.extract_options = self.extract_options.with_pages(pages);
        self
    }

    /// Set the inference configuration.
    pub fn with_config(mut self, config: InferenceConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the heading rules.
    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Extract the text runs of a PDF file.
    pub fn runs<P: AsRef<Path>>(&self, path: P) -> Result<Vec<TextRun>> {
        PdfRunExtractor::open_with_options(path, self.extract_options.clone())?.extract_runs()
    }

    /// Infer the outline of a PDF file.
    pub fn outline<P: AsRef<Path>>(&self, path: P) -> Result<Outline> {
        let runs = self.runs(path)?;
        self.engine().infer(&runs)
    }

    /// Infer the outline of a PDF held in memory.
    pub fn outline_bytes(&self, data: &[u8]) -> Result<Outline> {
        let runs = PdfRunExtractor::from_bytes_with_options(data, self.extract_options.clone())?
            .extract_runs()?;
        self.engine().infer(&runs)
    }

    /// The inference engine this builder configures.
    pub fn engine(&self) -> OutlineEngine {
        OutlineEngine::new(self.config.clone()).with_rules(self.rules.clone())
    }
}
