//! Output entities: title, leveled headings and the outline.

use serde::{Deserialize, Serialize};

/// Heading level, H1 (outermost) through H6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    /// Map a contiguous cluster rank to a level. Ranks past 5 collapse to H6.
    pub fn from_rank(rank: usize) -> Self {
        Self::ALL[rank.min(5)]
    }

    /// Numeric depth, 1 through 6.
    pub fn depth(self) -> u8 {
        self as u8 + 1
    }

    /// One level deeper, saturating at H6.
    pub fn deeper(self) -> Self {
        Self::from_rank(self as usize + 1)
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "H{}", self.depth())
    }
}

/// A leveled heading anchored to a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub level: HeadingLevel,
    pub text: String,
    /// 1-based page number
    pub page: u32,
    /// Vertical position on the page (top edge); not part of the output
    #[serde(skip, default)]
    pub y: f32,
}

/// The document title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Title {
    pub text: String,
}

/// Title plus page-ordered headings for one document.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Outline {
    pub title: Option<Title>,
    #[serde(rename = "outline")]
    pub headings: Vec<Heading>,
}

impl Outline {
    /// An outline with no title and no headings.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether neither a title nor any heading was found.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.headings.is_empty()
    }

    /// Title text, if any.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_ref().map(|t| t.text.as_str())
    }
}
