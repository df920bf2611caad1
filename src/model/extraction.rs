//! Extraction output types.

use serde::{Deserialize, Serialize};

use super::dom::ElementData;
use super::geometry::{BoundingBox, PageDimensions};

/// A class label that repeated consecutively in document order.
///
/// `classes` is `None` for a run of elements without any class attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRun {
    /// The repeated class list
    pub classes: Option<Vec<String>>,
    /// Length of the unbroken run
    pub count: usize,
}

impl ClassRun {
    /// Create a class run.
    pub fn new(classes: Option<Vec<String>>, count: usize) -> Self {
        Self { classes, count }
    }
}

/// A structural filler label used as a boundary between problems.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StopMarkerClass {
    classes: Vec<String>,
}

impl StopMarkerClass {
    /// Create a stop marker from its class list.
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    /// Create a stop marker from a space-joined label.
    pub fn parse(key: &str) -> Self {
        Self::new(key.split_whitespace().map(str::to_string).collect())
    }

    /// Class labels.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Space-joined label.
    pub fn key(&self) -> String {
        self.classes.join(" ")
    }

    /// Whether an element carries exactly this class list.
    pub fn matches(&self, element: &ElementData) -> bool {
        element.classes == self.classes
    }
}

impl std::fmt::Display for StopMarkerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Problem regions and text for every non-empty page of a document.
///
/// `pages_positions[i][j]` is the region of the text in `pages[i][j]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedPages {
    /// Per-page problem bounding boxes
    pub pages_positions: Vec<Vec<BoundingBox>>,
    /// Per-page normalized problem fragments
    pub pages: Vec<Vec<String>>,
}

impl ExtractedPages {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page; pages without problems are skipped.
    ///
    /// Both lists are truncated to the shorter length so regions and
    /// fragments stay index-aligned.
    pub fn push_page(&mut self, mut positions: Vec<BoundingBox>, mut fragments: Vec<String>) {
        align(&mut positions, &mut fragments);
        if positions.is_empty() || fragments.is_empty() {
            return;
        }
        self.pages_positions.push(positions);
        self.pages.push(fragments);
    }

    /// Number of non-empty pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total number of problems.
    pub fn problem_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    /// Whether no page yielded a problem.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Iterate `(position, fragment)` pairs with their page index.
    pub fn problems(&self) -> impl Iterator<Item = (usize, &BoundingBox, &str)> {
        self.pages_positions
            .iter()
            .zip(&self.pages)
            .enumerate()
            .flat_map(|(page, (positions, fragments))| {
                positions
                    .iter()
                    .zip(fragments)
                    .map(move |(pos, text)| (page, pos, text.as_str()))
            })
    }
}

/// Endnote (answer) regions and text for every non-empty page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEndnotes {
    /// Per-page numbered-item bounding boxes
    pub positions: Vec<Vec<BoundingBox>>,
    /// Per-page numbered-item bodies
    pub endnotes: Vec<Vec<String>>,
}

impl ExtractedEndnotes {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page; a page is skipped when either list is empty.
    pub fn push_page(&mut self, mut positions: Vec<BoundingBox>, mut endnotes: Vec<String>) {
        align(&mut positions, &mut endnotes);
        if positions.is_empty() || endnotes.is_empty() {
            return;
        }
        self.positions.push(positions);
        self.endnotes.push(endnotes);
    }

    /// Number of non-empty pages.
    pub fn page_count(&self) -> usize {
        self.endnotes.len()
    }

    /// Total number of endnotes.
    pub fn endnote_count(&self) -> usize {
        self.endnotes.iter().map(Vec::len).sum()
    }

    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.endnotes.is_empty() && self.positions.is_empty()
    }
}

fn align(positions: &mut Vec<BoundingBox>, texts: &mut Vec<String>) {
    if positions.len() != texts.len() {
        log::warn!(
            "{} regions but {} texts on one page, truncating",
            positions.len(),
            texts.len()
        );
        let n = positions.len().min(texts.len());
        positions.truncate(n);
        texts.truncate(n);
    }
}

/// Per-page summary produced by document inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-indexed page container number
    pub number: u32,
    /// Page size
    pub dimensions: PageDimensions,
    /// Problem-start markers on the page
    pub problem_markers: usize,
}

/// Layout facts about a document, gathered without normalizing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Page containers in document order
    pub pages: Vec<PageSummary>,
    /// Repeated class runs over the whole body
    pub class_runs: Vec<ClassRun>,
    /// Stop markers derived from the runs
    pub stop_markers: Vec<StopMarkerClass>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_marker_matches_exact_list() {
        let marker = StopMarkerClass::parse("hls ps4");
        assert_eq!(marker.key(), "hls ps4");
        assert!(marker.matches(&ElementData::new("div").with_class("hls ps4")));
        assert!(!marker.matches(&ElementData::new("div").with_class("ps4 hls")));
        assert!(!marker.matches(&ElementData::new("div").with_class("hls")));
    }

    #[test]
    fn test_push_page_drops_empty() {
        let mut out = ExtractedPages::new();
        out.push_page(Vec::new(), Vec::new());
        assert!(out.is_empty());

        out.push_page(vec![BoundingBox::default()], vec!["a".to_string()]);
        assert_eq!(out.page_count(), 1);
        assert_eq!(out.problem_count(), 1);
        let all: Vec<_> = out.problems().collect();
        assert_eq!(all[0].0, 0);
        assert_eq!(all[0].2, "a");
    }

    #[test]
    fn test_push_page_truncates_mismatch() {
        let mut out = ExtractedPages::new();
        out.push_page(
            vec![BoundingBox::default(); 2],
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
        );
        assert_eq!(out.pages_positions[0].len(), 2);
        assert_eq!(out.pages[0], vec!["a", "b"]);

        let mut notes = ExtractedEndnotes::new();
        notes.push_page(vec![BoundingBox::default()], vec!["x".to_string(), "y".to_string()]);
        assert_eq!(notes.positions[0].len(), 1);
        assert_eq!(notes.endnotes[0], vec!["x"]);

        notes.push_page(Vec::new(), vec!["z".to_string()]);
        assert_eq!(notes.page_count(), 1);
    }
}
