//! Content stream walker: text operators to positioned runs.

use std::collections::HashMap;

use crate::model::{BBox, TextRun};

use super::backend::{
    decode_text_simple, ContentOp, FontInfo, PdfValue, PlainDecoder, TextDecoder,
};

/// Average glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

/// Ascent and descent as fractions of the font size.
const ASCENT: f32 = 0.8;
const DESCENT: f32 = 0.2;

/// TJ adjustment (thousandths of an em) wide enough to stand for a space.
const SPACE_THRESHOLD: f32 = 200.0;

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    // Start of the current line, moved by Td/TD/T*
    line_e: f32,
    line_f: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            line_e: 0.0,
            line_f: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        *self = Self {
            a,
            b,
            c,
            d,
            e,
            f,
            line_e: e,
            line_f: f,
        };
    }

    /// Move to the start of the next line, offset from the current line start.
    fn translate(&mut self, tx: f32, ty: f32) {
        self.line_e += tx * self.a + ty * self.c;
        self.line_f += tx * self.b + ty * self.d;
        self.e = self.line_e;
        self.f = self.line_f;
    }

    /// Advance along the baseline after showing text.
    fn advance(&mut self, tx: f32) {
        self.e += tx * self.a;
        self.f += tx * self.b;
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    /// Horizontal and vertical scale of text space.
    fn scale(&self) -> (f32, f32) {
        (
            (self.a * self.a + self.b * self.b).sqrt(),
            (self.c * self.c + self.d * self.d).sqrt(),
        )
    }
}

/// Graphics-independent text state.
#[derive(Debug, Clone)]
struct TextState {
    font: Option<Vec<u8>>,
    font_size: f32,
    leading: f32,
    matrix: TextMatrix,
    in_text: bool,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 12.0,
            leading: 0.0,
            matrix: TextMatrix::default(),
            in_text: false,
        }
    }
}

/// Turns one page's content stream into text runs.
pub struct PageWalker<'a> {
    fonts: HashMap<&'a [u8], &'a FontInfo>,
    decoder: &'a dyn TextDecoder,
    page: u32,
    page_height: f32,
    state: TextState,
    runs: Vec<TextRun>,
}

impl<'a> PageWalker<'a> {
    /// Create a walker for a page of the given height (points).
    pub fn new(fonts: &'a [FontInfo], page: u32, page_height: f32) -> Self {
        Self {
            fonts: fonts.iter().map(|f| (f.name.as_slice(), f)).collect(),
            decoder: &PlainDecoder,
            page,
            page_height,
            state: TextState::default(),
            runs: Vec::new(),
        }
    }

    /// Decode string operands with the page's font encodings.
    pub fn with_decoder(mut self, decoder: &'a dyn TextDecoder) -> Self {
        self.decoder = decoder;
        self
    }

    /// Walk every operation and return the runs found, in stream order.
    pub fn walk(mut self, ops: &[ContentOp]) -> Vec<TextRun> {
        for op in ops {
            self.apply(op);
        }
        self.runs
    }

    fn apply(&mut self, op: &ContentOp) {
        let num = |i: usize, default: f32| {
            op.operands
                .get(i)
                .and_then(PdfValue::as_number)
                .unwrap_or(default)
        };

        match op.operator.as_str() {
            "BT" => {
                self.state.in_text = true;
                self.state.matrix = TextMatrix::default();
            }
            "ET" => {
                self.state.in_text = false;
            }
            "Tf" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    self.state.font = Some(name.clone());
                }
                self.state.font_size = num(1, self.state.font_size);
            }
            "TL" => {
                self.state.leading = num(0, 0.0);
            }
            "Td" => {
                self.state.matrix.translate(num(0, 0.0), num(1, 0.0));
            }
            "TD" => {
                let ty = num(1, 0.0);
                self.state.leading = -ty;
                self.state.matrix.translate(num(0, 0.0), ty);
            }
            "Tm" => {
                self.state.matrix.set(
                    num(0, 1.0),
                    num(1, 0.0),
                    num(2, 0.0),
                    num(3, 1.0),
                    num(4, 0.0),
                    num(5, 0.0),
                );
            }
            "T*" => {
                self.next_line();
            }
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = self.decode(bytes);
                    self.show(text, 0.0);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show_array(items);
                }
            }
            "'" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    let text = self.decode(bytes);
                    self.show(text, 0.0);
                }
            }
            "\"" => {
                self.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    let text = self.decode(bytes);
                    self.show(text, 0.0);
                }
            }
            _ => {}
        }
    }

    fn next_line(&mut self) {
        let leading = if self.state.leading > 0.0 {
            self.state.leading
        } else {
            self.state.font_size * 1.2
        };
        self.state.matrix.translate(0.0, -leading);
    }

    fn decode(&self, bytes: &[u8]) -> String {
        match self.state.font.as_deref() {
            Some(font) => self.decoder.decode(font, bytes),
            None => decode_text_simple(bytes),
        }
    }

    fn current_font(&self) -> Option<&'a FontInfo> {
        self.state
            .font
            .as_deref()
            .and_then(|name| self.fonts.get(name).copied())
    }

    /// TJ: strings interleaved with kerning adjustments in thousandths of an em.
    /// Large negative adjustments stand for word spaces.
    fn show_array(&mut self, items: &[PdfValue]) {
        let mut combined = String::new();
        let mut kerning = 0.0;

        for item in items {
            match item {
                PdfValue::Str(bytes) => combined.push_str(&self.decode(bytes)),
                other => {
                    let Some(n) = other.as_number() else {
                        continue;
                    };
                    let adjustment = -n;
                    kerning += adjustment / 1000.0 * self.state.font_size;
                    if adjustment > SPACE_THRESHOLD
                        && combined.chars().last().is_some_and(|c| {
                            !c.is_whitespace() && !is_spaceless_script_char(c)
                        })
                    {
                        combined.push(' ');
                    }
                }
            }
        }

        self.show(combined, kerning);
    }

    /// Emit a run at the current position and advance past it.
    ///
    /// The run's box covers the trimmed text only. Boundary whitespace still
    /// advances the pen, so it shows up as a gap to the neighbouring run.
    fn show(&mut self, text: String, extra_advance: f32) {
        let glyph = self.state.font_size * AVG_GLYPH_WIDTH;
        let width = text.chars().count() as f32 * glyph + extra_advance;
        let trimmed = text.trim();

        if self.state.in_text && !trimmed.is_empty() {
            let leading = text.chars().take_while(|c| c.is_whitespace()).count() as f32;
            let trailing = text.chars().rev().take_while(|c| c.is_whitespace()).count() as f32;
            let (x, y) = self.state.matrix.position();
            let (sx, sy) = self.state.matrix.scale();
            let size = self.state.font_size * sy;
            let font = self.current_font();

            // Flip to a top-left origin
            let top = self.page_height - (y + ASCENT * size);
            let bottom = self.page_height - (y - DESCENT * size);

            let x0 = x + leading * glyph * sx;
            let x1 = (x + (width - trailing * glyph) * sx).max(x0);

            self.runs.push(TextRun::new(
                trimmed,
                font.map(|f| f.base_font.clone()).unwrap_or_else(|| "Unknown".to_string()),
                size,
                font.is_some_and(|f| f.bold),
                BBox::new(x0, top, x1, bottom),
                self.page,
            ));
        }

        self.state.matrix.advance(width);
    }
}

/// Whether a character belongs to a script written without word spaces.
/// Hangul is not included; Korean uses spaces between words.
fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF
        | 0x3400..=0x4DBF
        | 0x20000..=0x2EBEF
        | 0x3040..=0x30FF
        | 0x3000..=0x303F)
}
