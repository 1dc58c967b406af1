//! Text run extraction from PDF files.

use std::io::Read;
use std::path::Path;

use crate::detect::{sniff_bytes, sniff_file};
use crate::error::{Error, Result};
use crate::model::TextRun;

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::options::{ErrorMode, ExtractOptions};
use super::walker::PageWalker;

/// Extracts positioned text runs from every selected page of a PDF.
pub struct PdfRunExtractor<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: ExtractOptions,
}

impl PdfRunExtractor<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        let header = sniff_file(path)?;
        log::debug!("Opening {} ({})", path.display(), header);

        let backend = LopdfBackend::load_file(path)?;
        Ok(Self { backend, options })
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ExtractOptions::default())
    }

    /// Load a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        sniff_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self { backend, options })
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(mut reader: R, options: ExtractOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.backend.version()
    }
}

impl<B: PdfBackend> PdfRunExtractor<B> {
    /// Wrap an existing backend.
    pub fn with_backend(backend: B, options: ExtractOptions) -> Self {
        Self { backend, options }
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Extract runs from every selected page, ordered by page.
    ///
    /// In lenient mode a page that cannot be decoded is logged and skipped.
    pub fn extract_runs(&self) -> Result<Vec<TextRun>> {
        let pages = self.backend.pages();
        let mut runs = Vec::new();

        for (&number, &id) in &pages {
            if !self.options.pages.includes(number) {
                continue;
            }
            match self.page_runs(number, id) {
                Ok(page_runs) => runs.extend(page_runs),
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Skipping page {}: {}", number, e);
                }
                Err(e) => {
                    return Err(Error::Extraction(format!("page {}: {}", number, e)));
                }
            }
        }

        log::debug!("Extracted {} runs from {} pages", runs.len(), pages.len());
        Ok(runs)
    }

    /// Extract runs from a single page (1-based).
    pub fn extract_page_runs(&self, page: u32) -> Result<Vec<TextRun>> {
        let pages = self.backend.pages();
        let id = pages
            .get(&page)
            .ok_or(Error::PageOutOfRange(page, pages.len() as u32))?;
        self.page_runs(page, *id)
    }

    fn page_runs(&self, number: u32, id: PageId) -> Result<Vec<TextRun>> {
        let fonts = self.backend.page_fonts(id)?;
        let ops = self.backend.page_operations(id)?;
        let (_, height) = self.backend.page_size(id);
        let decoder = self.backend.text_decoder(id);

        let runs = PageWalker::new(&fonts, number, height)
            .with_decoder(&*decoder)
            .walk(&ops);
        log::trace!("Page {}: {} operations, {} runs", number, ops.len(), runs.len());
        Ok(runs)
    }
}
