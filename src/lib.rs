//! # exampage
//!
//! Problem-region extraction for converted exam documents.
//!
//! Word-processor exports place every line in nested, relatively positioned
//! boxes. This library recovers page-relative bounding boxes for each
//! problem, splits the page stream into per-problem fragments, and
//! normalizes each fragment to compact, placeholder-bearing markup.
//!
//! ## Quick Start
//!
//! ```no_run
//! use exampage::{extract_pages_from_file, EquationMap};
//!
//! fn main() -> exampage::Result<()> {
//!     let result = extract_pages_from_file("exam.html", &EquationMap::new())?;
//!
//!     for (page, bbox, text) in result.problems() {
//!         println!("page {}: {:?} {}", page, bbox.to_array(), text);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Layout-agnostic boundaries**: filler lines are found by run-length analysis
//! - **Page-relative geometry**: boxes are ratios of the page size
//! - **Equation spans**: converter identifiers are kept as `$id$`
//! - **Endnotes**: numbered answer sheets are split into per-answer text
//! - **Parallel processing**: Uses Rayon for multi-page documents

pub mod error;
pub mod extract;
pub mod layout;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use extract::{ExamPage, PageExtractor};
pub use model::{
    BoundingBox, ClassRun, DocumentInfo, ExtractedEndnotes, ExtractedPages, HtmlTree,
    PageDimensions, PageSummary, StopMarkerClass, StyleBox,
};
pub use parser::{parse_html, ExtractOptions, PageSelection};
pub use render::{EndnotesRecord, EquationMap, JsonFormat, PagesRecord, PositionsRecord};

use std::path::Path;

/// Extract problem regions and text from markup.
///
/// # Arguments
///
/// * `markup` - Converted document markup
/// * `equations` - Equation identifiers to delimit as `$id$`
///
/// # Example
///
/// ```
/// use exampage::{extract_pages, EquationMap};
///
/// let result = extract_pages("<html><body></body></html>", &EquationMap::new());
/// assert!(result.is_empty());
/// ```
pub fn extract_pages(markup: &str, equations: &EquationMap) -> ExtractedPages {
    PageExtractor::new(markup)
        .with_equations(equations.clone())
        .extract_pages()
}

/// Extract problem regions and text from a markup file.
pub fn extract_pages_from_file<P: AsRef<Path>>(
    path: P,
    equations: &EquationMap,
) -> Result<ExtractedPages> {
    Ok(PageExtractor::open(path, ExtractOptions::default())?
        .with_equations(equations.clone())
        .extract_pages())
}

/// Extract numbered answers from endnote markup.
pub fn extract_endnotes(markup: &str, equations: &EquationMap) -> ExtractedEndnotes {
    PageExtractor::new(markup)
        .with_equations(equations.clone())
        .extract_endnotes()
}

/// Extract numbered answers from an endnote markup file.
pub fn extract_endnotes_from_file<P: AsRef<Path>>(
    path: P,
    equations: &EquationMap,
) -> Result<ExtractedEndnotes> {
    Ok(PageExtractor::open(path, ExtractOptions::default())?
        .with_equations(equations.clone())
        .extract_endnotes())
}

/// Report layout facts about a markup file.
pub fn inspect_file<P: AsRef<Path>>(path: P) -> Result<DocumentInfo> {
    Ok(PageExtractor::open(path, ExtractOptions::default())?.inspect())
}
