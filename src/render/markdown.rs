//! Markdown rendering for outlines.

use crate::model::Outline;

/// Render an outline as a nested Markdown list under the title.
///
/// Each heading becomes `- text (p. n)`, indented two spaces per level
/// below H1. Levels are not required to nest, so an H3 may follow an H1.
pub fn to_markdown(outline: &Outline) -> String {
    let mut output = String::new();

    if let Some(title) = outline.title_text() {
        output.push_str("# ");
        output.push_str(&escape_markdown(title));
        output.push_str("\n\n");
    }

    for heading in &outline.headings {
        let indent = "  ".repeat(usize::from(heading.level.depth() - 1));
        output.push_str(&format!(
            "{}- {} (p. {})\n",
            indent,
            escape_markdown(&heading.text),
            heading.page
        ));
    }

    output
}

fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '`' | '*' | '_' | '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}
