//! PDF backend abstraction layer.
//!
//! The content-stream walker only sees [`ContentOp`]s and [`FontInfo`]s, so
//! the concrete PDF library (lopdf) stays behind the [`PdfBackend`] trait.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Encoding, Object};

use crate::error::{Error, Result};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// US Letter, used when a page declares no MediaBox anywhere in its tree.
const DEFAULT_PAGE_SIZE: (f32, f32) = (612.0, 792.0);

/// `ForceBold` in the font descriptor flags (bit 19).
const FORCE_BOLD_FLAG: i64 = 1 << 18;

/// Font information for one font resource on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct FontInfo {
    /// Font resource name (key in the page's font dictionary)
    pub name: Vec<u8>,
    /// Base font name without subset prefix (e.g., "Helvetica-Bold")
    pub base_font: String,
    /// Best-effort bold flag
    pub bold: bool,
}

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    /// Create an operation.
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }
}

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// All pages as page number (1-based) to page id.
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Page width and height in points.
    fn page_size(&self, page: PageId) -> (f32, f32);

    /// Fonts available to a page.
    fn page_fonts(&self, page: PageId) -> Result<Vec<FontInfo>>;

    /// Decoded content stream operations of a page.
    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>>;

    /// Text decoder for the string operands of a page, keyed by font
    /// resource name.
    fn text_decoder(&self, _page: PageId) -> Box<dyn TextDecoder + '_> {
        Box::new(PlainDecoder)
    }
}

/// Turns the bytes of a string operand into text.
pub trait TextDecoder {
    /// Decode `bytes` shown with the font resource `font`.
    fn decode(&self, font: &[u8], bytes: &[u8]) -> String;
}

/// Decoder that ignores fonts and uses [`decode_text_simple`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDecoder;

impl TextDecoder for PlainDecoder {
    fn decode(&self, _font: &[u8], bytes: &[u8]) -> String {
        decode_text_simple(bytes)
    }
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Whether a font is bold, judged from its name and descriptor.
pub fn is_bold_font(base_font: &str, weight: Option<f32>, flags: Option<i64>) -> bool {
    let name = base_font.to_lowercase();
    let named_bold = ["bold", "black", "heavy", "semibold", "demi"]
        .iter()
        .any(|w| name.contains(w));

    named_bold
        || weight.is_some_and(|w| w >= 600.0)
        || flags.is_some_and(|f| f & FORCE_BOLD_FLAG != 0)
}

/// Drop a subset tag such as `ABCDEF+` from a font name.
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

// ---------------------------------------------------------------------------
// LopdfBackend
// ---------------------------------------------------------------------------

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::load_bytes(&data)
    }

    /// Load from an in-memory byte slice.
    ///
    /// Reader errors here come from a malformed document, not the OS, so
    /// they surface as [`Error::PdfParse`].
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        let doc = LopdfDocument::load_mem(data).map_err(|e| match e {
            lopdf::Error::IO(io) => Error::PdfParse(io.to_string()),
            other => Error::from(other),
        })?;
        Self::checked(doc)
    }

    fn checked(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Walk up the page tree to find the MediaBox.
    fn find_media_box(&self, dict: &Dictionary) -> Option<Vec<f32>> {
        if let Ok(obj) = dict.get(b"MediaBox") {
            let array = match obj {
                Object::Array(arr) => Some(arr),
                Object::Reference(id) => self.doc.get_object(*id).ok().and_then(|o| o.as_array().ok()),
                _ => None,
            };
            if let Some(array) = array {
                let nums: Vec<f32> = array.iter().filter_map(|o| o.as_float().ok()).collect();
                if nums.len() >= 4 {
                    return Some(nums);
                }
            }
        }

        let parent = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent = self.doc.get_dictionary(parent).ok()?;
        self.find_media_box(parent)
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match obj {
            Object::Dictionary(d) => Some(d),
            Object::Reference(id) => self.doc.get_dictionary(*id).ok(),
            _ => None,
        }
    }

    fn font_info(&self, name: &[u8], dict: &Dictionary) -> FontInfo {
        let base_font = dict
            .get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| strip_subset_prefix(&String::from_utf8_lossy(n)).to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let descriptor = dict
            .get(b"FontDescriptor")
            .ok()
            .and_then(|o| self.resolve_dict(o));
        let weight = descriptor
            .and_then(|d| d.get(b"FontWeight").ok())
            .and_then(|o| o.as_float().ok());
        let flags = descriptor
            .and_then(|d| d.get(b"Flags").ok())
            .and_then(|o| o.as_i64().ok());

        FontInfo {
            name: name.to_vec(),
            bold: is_bold_font(&base_font, weight, flags),
            base_font,
        }
    }
}

/// Font encodings of one page, resolved once by lopdf.
///
/// Fonts whose encoding lopdf cannot resolve (an Identity font without a
/// ToUnicode CMap, a non-font dictionary) are absent and decode through
/// [`decode_text_simple`].
struct PageEncodings<'a> {
    encodings: HashMap<Vec<u8>, Encoding<'a>>,
}

impl TextDecoder for PageEncodings<'_> {
    fn decode(&self, font: &[u8], bytes: &[u8]) -> String {
        self.encodings
            .get(font)
            .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
            .unwrap_or_else(|| decode_text_simple(bytes))
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_size(&self, page: PageId) -> (f32, f32) {
        self.doc
            .get_dictionary(page)
            .ok()
            .and_then(|dict| self.find_media_box(dict))
            .map(|b| ((b[2] - b[0]).abs(), (b[3] - b[1]).abs()))
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<FontInfo>> {
        let fonts = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(fonts
            .iter()
            .map(|(name, dict)| self.font_info(name, dict))
            .collect())
    }

    fn page_operations(&self, page: PageId) -> Result<Vec<ContentOp>> {
        let data = self
            .doc
            .get_page_content(page)
            .map_err(|e| Error::PdfParse(format!("cannot get page content: {}", e)))?;
        let content = lopdf::content::Content::decode(&data)
            .map_err(|e| Error::PdfParse(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operands: op.operands.iter().map(convert_object).collect(),
                operator: op.operator,
            })
            .collect())
    }

    fn text_decoder(&self, page: PageId) -> Box<dyn TextDecoder + '_> {
        let encodings = match self.doc.get_page_fonts(page) {
            Ok(fonts) => fonts
                .into_iter()
                .filter_map(|(name, dict)| match dict.get_font_encoding(&self.doc) {
                    Ok(enc) => Some((name, enc)),
                    Err(e) => {
                        log::debug!(
                            "font {} has no usable encoding: {}",
                            String::from_utf8_lossy(&name),
                            e
                        );
                        None
                    }
                })
                .collect(),
            Err(e) => {
                log::debug!("no fonts for page {:?}: {}", page, e);
                HashMap::new()
            }
        };
        Box::new(PageEncodings { encodings })
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}
