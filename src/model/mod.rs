//! Document model types.
//!
//! Runs come from the extraction layer, lines are derived by the line
//! aggregator, and the outline types are the final output of inference.
//! Everything here is immutable once constructed.

mod line;
mod outline;
mod run;

pub use line::Line;
pub use outline::{Heading, HeadingLevel, Outline, Title};
pub use run::{BBox, TextRun};
