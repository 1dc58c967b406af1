//! Output rendering for outlines.

mod json;
mod markdown;

pub use json::{to_json, JsonFormat};
pub use markdown::to_markdown;

/// Output format for a single outline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `{"title", "outline"}` JSON
    #[default]
    Json,
    /// Nested Markdown list
    Markdown,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
        }
    }
}

/// Render an outline in the given format.
pub fn render(
    outline: &crate::model::Outline,
    format: OutputFormat,
    json: JsonFormat,
) -> crate::error::Result<String> {
    match format {
        OutputFormat::Json => to_json(outline, json),
        OutputFormat::Markdown => Ok(to_markdown(outline)),
    }
}
