//! Extraction options and configuration.

use std::ops::RangeInclusive;

use crate::error::{Error, Result};

/// Options controlling layout detection and normalization.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Minimum consecutive repeats for a class to count as a stop marker
    pub repeat_threshold: usize,

    /// Consecutive stop-marker elements that close a problem region
    pub stop_run_length: usize,

    /// Look-ahead below the first stop marker, in millimetres
    pub bottom_allowance_mm: f64,

    /// Class of problem-start marker elements
    pub problem_class: String,

    /// Class of decorative containers removed before segmentation
    pub ignore_class: String,

    /// Class of line containers on endnote pages
    pub line_class: String,

    /// Token substituted for embedded images
    pub placeholder: String,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Which top-level page containers to process
    pub pages: PageSelection,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stop-marker repeat threshold.
    pub fn with_repeat_threshold(mut self, threshold: usize) -> Self {
        self.repeat_threshold = threshold.max(1);
        self
    }

    /// Set the number of stop markers that close a problem.
    pub fn with_stop_run_length(mut self, length: usize) -> Self {
        self.stop_run_length = length.max(1);
        self
    }

    /// Set the bottom look-ahead allowance in millimetres.
    pub fn with_bottom_allowance(mut self, mm: f64) -> Self {
        self.bottom_allowance_mm = mm;
        self
    }

    /// Set the problem-start marker class.
    pub fn with_problem_class(mut self, class: impl Into<String>) -> Self {
        self.problem_class = class.into();
        self
    }

    /// Set the decorative container class.
    pub fn with_ignore_class(mut self, class: impl Into<String>) -> Self {
        self.ignore_class = class.into();
        self
    }

    /// Set the endnote line container class.
    pub fn with_line_class(mut self, class: impl Into<String>) -> Self {
        self.line_class = class.into();
        self
    }

    /// Set the image placeholder token.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            repeat_threshold: 4,
            stop_run_length: 3,
            bottom_allowance_mm: 60.0,
            problem_class: "hhe".to_string(),
            ignore_class: "heq".to_string(),
            line_class: "hls".to_string(),
            placeholder: "[image]".to_string(),
            parallel: true,
            pages: PageSelection::All,
        }
    }
}

/// Page selection for extraction (1-indexed page containers).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// All pages
    #[default]
    All,
    /// A range of pages (inclusive)
    Range(RangeInclusive<u32>),
    /// Specific pages
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s == "all" {
            return Ok(PageSelection::All);
        }

        let number = |v: &str| -> Result<u32> {
            v.trim()
                .parse()
                .map_err(|_| Error::InvalidPageRange(format!("invalid page number '{}'", v)))
        };

        if let Some((start, end)) = s.split_once('-') {
            if !start.contains(',') && !end.contains(',') {
                let (start, end) = (number(start)?, number(end)?);
                if start > end {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut pages = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            if let Some((start, end)) = part.split_once('-') {
                for p in number(start)?..=number(end)? {
                    if !pages.contains(&p) {
                        pages.push(p);
                    }
                }
            } else {
                let p = number(part)?;
                if !pages.contains(&p) {
                    pages.push(p);
                }
            }
        }

        pages.sort_unstable();
        Ok(PageSelection::Pages(pages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .with_repeat_threshold(5)
            .with_stop_run_length(0)
            .with_placeholder("<img>")
            .sequential();

        assert_eq!(options.repeat_threshold, 5);
        assert_eq!(options.stop_run_length, 1);
        assert_eq!(options.placeholder, "<img>");
        assert!(!options.parallel);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.repeat_threshold, 4);
        assert_eq!(options.stop_run_length, 3);
        assert_eq!(options.bottom_allowance_mm, 60.0);
        assert_eq!(options.problem_class, "hhe");
        assert!(options.parallel);
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("2-4").unwrap(),
            PageSelection::Range(2..=4)
        );
        assert_eq!(
            PageSelection::parse("5,1,3-4,1").unwrap(),
            PageSelection::Pages(vec![1, 3, 4, 5])
        );
        assert!(PageSelection::parse("x").is_err());
        assert!(PageSelection::parse("4-2").is_err());
    }

    #[test]
    fn test_page_selection_includes() {
        let sel = PageSelection::parse("1,3").unwrap();
        assert!(sel.includes(3));
        assert!(!sel.includes(2));
        assert!(PageSelection::All.includes(99));
    }
}
