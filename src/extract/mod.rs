//! Run extraction: PDF pages to positioned, styled text runs.

mod backend;
mod options;
mod pdf_extractor;
mod walker;

pub use backend::{
    decode_text_simple, is_bold_font, ContentOp, FontInfo, LopdfBackend, PageId, PdfBackend,
    PdfValue, PlainDecoder, TextDecoder,
};
pub use options::{ErrorMode, ExtractOptions, PageSelection};
pub use pdf_extractor::PdfRunExtractor;
pub use walker::PageWalker;
