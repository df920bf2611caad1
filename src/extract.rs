//! Document extraction pipeline.
//!
//! Positions are read from the untouched tree first. The tree is then
//! trimmed, equation identifiers are delimited, pages are cleaned, and every
//! page is segmented and normalized independently.

use std::path::Path;

use rayon::prelude::*;

use crate::error::Result;
use crate::layout::{
    page_containers, problem_markers, split_numbered_items, stop_markers, text_lines,
    trim_stop_runs, ClassRunDetector, CoordinateAccumulator, EndnoteLocator, PageSegmenter,
};
use crate::model::{
    BoundingBox, DocumentInfo, ExtractedEndnotes, ExtractedPages, HtmlTree, NodeId, PageSummary,
    StopMarkerClass,
};
use crate::parser::{page_dimensions, parse_html, ExtractOptions, PageSelection};
use crate::render::{delimit_equations, ContentNormalizer, EquationMap};

/// Extracts problem regions and text from one converted document.
pub struct PageExtractor {
    tree: HtmlTree,
    options: ExtractOptions,
    equations: EquationMap,
}

impl PageExtractor {
    /// Parse markup with default options.
    pub fn new(markup: &str) -> Self {
        Self::with_options(markup, ExtractOptions::default())
    }

    /// Parse markup with custom options.
    pub fn with_options(markup: &str, options: ExtractOptions) -> Self {
        Self {
            tree: parse_html(markup),
            options,
            equations: EquationMap::new(),
        }
    }

    /// Read and parse a markup file.
    pub fn open<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let markup = std::fs::read_to_string(path)?;
        Ok(Self::with_options(&markup, options))
    }

    /// Set the equation identifiers to delimit.
    pub fn with_equations(mut self, equations: EquationMap) -> Self {
        self.equations = equations;
        self
    }

    /// The parsed document.
    pub fn tree(&self) -> &HtmlTree {
        &self.tree
    }

    /// The active options.
    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Stop markers derived from the class runs of the whole body.
    pub fn stop_markers(&self) -> Vec<StopMarkerClass> {
        let runs = ClassRunDetector::new(self.options.repeat_threshold)
            .detect_in(&self.tree, self.tree.body());
        stop_markers(&runs)
    }

    /// Selected page containers, 1-indexed.
    fn selected_pages(&self) -> Vec<(u32, NodeId)> {
        page_containers(&self.tree, self.tree.body())
            .into_iter()
            .filter(|(number, _)| self.options.pages.includes(*number))
            .collect()
    }

    /// Map pages with the parallelism the options ask for.
    fn map_pages<T, F>(&self, pages: &[(u32, NodeId)], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&(u32, NodeId)) -> T + Sync + Send,
    {
        if self.options.parallel {
            pages.par_iter().map(f).collect()
        } else {
            pages.iter().map(f).collect()
        }
    }

    /// Gather layout facts without modifying the document.
    pub fn inspect(&self) -> DocumentInfo {
        let body = self.tree.body();
        let class_runs =
            ClassRunDetector::new(self.options.repeat_threshold).detect_in(&self.tree, body);
        let stop_markers = stop_markers(&class_runs);

        let pages = page_containers(&self.tree, body)
            .into_iter()
            .map(|(number, page)| PageSummary {
                number,
                dimensions: self
                    .tree
                    .element(page)
                    .map(|el| page_dimensions(el.style()))
                    .unwrap_or_default(),
                problem_markers: problem_markers(&self.tree, page, &self.options.problem_class)
                    .len(),
            })
            .collect();

        DocumentInfo {
            pages,
            class_runs,
            stop_markers,
        }
    }

    /// Extract problem regions and their normalized text.
    ///
    /// Pages without problems are dropped from both outputs.
    pub fn extract_pages(mut self) -> ExtractedPages {
        let markers = self.stop_markers();
        log::debug!(
            "Stop markers: [{}]",
            markers
                .iter()
                .map(StopMarkerClass::key)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let pages: Vec<(u32, NodeId)> = self
            .selected_pages()
            .into_iter()
            .filter(|&(_, page)| {
                !problem_markers(&self.tree, page, &self.options.problem_class).is_empty()
            })
            .collect();

        let positions: Vec<Vec<BoundingBox>> = {
            let accumulator = CoordinateAccumulator::new(&self.tree, &markers, &self.options);
            let problem_class = self.options.problem_class.as_str();
            self.map_pages(&pages, |&(_, page)| {
                accumulator.page_positions(page, problem_class)
            })
        };

        // The segmenter closes a fragment on `stop_run_length` stop elements.
        let keep = self
            .options
            .stop_run_length
            .max(self.options.repeat_threshold.saturating_sub(1));
        let body = self.tree.body();
        trim_stop_runs(
            &mut self.tree,
            body,
            &markers,
            keep,
            &self.options.problem_class,
        );
        delimit_equations(&mut self.tree, body, &self.equations);

        let segmenter = PageSegmenter::new(&markers, &self.options);
        for &(_, page) in &pages {
            segmenter.clean_page(&mut self.tree, page);
        }

        let normalizer = ContentNormalizer::new(self.options.placeholder.clone());
        let fragments: Vec<Vec<String>> = self.map_pages(&pages, |&(_, page)| {
            segmenter
                .segment(&self.tree, page)
                .into_iter()
                .map(|fragment| normalizer.normalize_fragment(fragment))
                .collect()
        });

        let mut result = ExtractedPages::new();
        for ((number, _), (boxes, texts)) in
            pages.iter().zip(positions.into_iter().zip(fragments))
        {
            if boxes.is_empty() {
                log::debug!("Page {}: no problems, dropped", number);
            }
            result.push_page(boxes, texts);
        }

        result
    }

    /// Extract numbered answers from endnote pages.
    ///
    /// A page is dropped when it yields no region or no answer text.
    pub fn extract_endnotes(mut self) -> ExtractedEndnotes {
        let pages = self.selected_pages();

        let positions: Vec<Vec<BoundingBox>> = {
            let locator = EndnoteLocator::new(&self.tree, &self.options.line_class);
            self.map_pages(&pages, |&(_, page)| locator.page_positions(page))
        };

        let body = self.tree.body();
        delimit_equations(&mut self.tree, body, &self.equations);

        let markers = self.stop_markers();
        let segmenter = PageSegmenter::new(&markers, &self.options);
        let normalizer = ContentNormalizer::new(self.options.placeholder.clone());
        for &(_, page) in &pages {
            segmenter.clean_page(&mut self.tree, page);
            normalizer.normalize_tree(&mut self.tree, page);
        }

        let endnotes: Vec<Vec<String>> = self.map_pages(&pages, |&(_, page)| {
            split_numbered_items(&text_lines(&self.tree, page))
        });

        let mut result = ExtractedEndnotes::new();
        for ((number, _), (boxes, items)) in pages.iter().zip(positions.into_iter().zip(endnotes))
        {
            if boxes.is_empty() || items.is_empty() {
                log::debug!("Endnote page {}: nothing found, dropped", number);
            }
            result.push_page(boxes, items);
        }

        result
    }
}

/// Builder for extracting exam documents.
///
/// # Example
///
/// ```no_run
/// use exampage::ExamPage;
///
/// let pages = ExamPage::new()
///     .with_placeholder("<img>")
///     .sequential()
///     .open("exam.html")?
///     .extract_pages();
/// println!("{} problems", pages.problem_count());
/// # Ok::<(), exampage::Error>(())
/// ```
pub struct ExamPage {
    options: ExtractOptions,
    equations: EquationMap,
}

impl ExamPage {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            options: ExtractOptions::default(),
            equations: EquationMap::new(),
        }
    }

    /// Replace all options.
    pub fn with_options(mut self, options: ExtractOptions) -> Self {
        self.options = options;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.options = self.options.with_pages(pages);
        self
    }

    /// Set the image placeholder token.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.options = self.options.with_placeholder(placeholder);
        self
    }

    /// Set the equation identifiers to delimit.
    pub fn with_equations(mut self, equations: EquationMap) -> Self {
        self.equations = equations;
        self
    }

    /// Load equation identifiers from a JSON file.
    pub fn with_equations_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        self.equations = EquationMap::from_json(&json)?;
        Ok(self)
    }

    /// Parse markup.
    pub fn parse(self, markup: &str) -> PageExtractor {
        PageExtractor::with_options(markup, self.options).with_equations(self.equations)
    }

    /// Read and parse a markup file.
    pub fn open<P: AsRef<Path>>(self, path: P) -> Result<PageExtractor> {
        Ok(PageExtractor::open(path, self.options)?.with_equations(self.equations))
    }
}

impl Default for ExamPage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STOPS: &str = r#"<div class="hls ps4" style="top:15mm"></div><div class="hls ps4" style="top:19mm"></div><div class="hls ps4" style="top:23mm"></div><div class="hls ps4" style="top:27mm"></div>"#;

    fn page(problem: &str) -> String {
        format!(
            r#"<div class="hpa" style="width:210mm;height:297mm;"><div class="hcD" style="left:5mm;top:8mm;"><div class="hls ps0" style="left:5mm;top:12mm;width:100mm;"><div class="hhe">{problem}</div></div>{STOPS}</div></div>"#
        )
    }

    fn document(pages: &[String]) -> String {
        format!("<html><body>{}</body></html>", pages.concat())
    }

    #[test]
    fn test_extract_pages_drops_empty_pages() {
        let blank = r#"<div class="hpa" style="width:210mm;height:297mm;"><p>cover</p></div>"#;
        let html = document(&[page("1) a"), blank.to_string(), page("2) b")]);
        let result = PageExtractor::new(&html).extract_pages();
        assert_eq!(result.page_count(), 2);
        assert_eq!(result.pages_positions.len(), result.pages.len());
        assert_eq!(result.pages[1], vec!["2) b".to_string()]);
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let html = document(&[page("1) a"), page("2) b"), page("3) c")]);
        let parallel = PageExtractor::new(&html).extract_pages();
        let sequential =
            PageExtractor::with_options(&html, ExtractOptions::new().sequential()).extract_pages();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_page_selection() {
        let html = document(&[page("1) a"), page("2) b"), page("3) c")]);
        let options = ExtractOptions::new().with_pages(PageSelection::Pages(vec![2]));
        let result = PageExtractor::with_options(&html, options).extract_pages();
        assert_eq!(result.pages, vec![vec!["2) b".to_string()]]);
    }

    #[test]
    fn test_equations_delimited() {
        let html = document(&[page("1) EQ01 value")]);
        let mut equations = EquationMap::new();
        equations.insert("EQ01", "x^2");
        let result = ExamPage::new()
            .with_equations(equations)
            .parse(&html)
            .extract_pages();
        assert_eq!(result.pages[0][0], "1) $EQ01$ value");
    }

    #[test]
    fn test_inspect() {
        let html = document(&[page("1) a"), page("2) b")]);
        let info = PageExtractor::new(&html).inspect();
        assert_eq!(info.pages.len(), 2);
        assert_eq!(info.pages[0].problem_markers, 1);
        assert_eq!(info.pages[0].dimensions.height, 297.0);
        assert_eq!(info.stop_markers, vec![StopMarkerClass::parse("hls ps4")]);
    }

    #[test]
    fn test_extract_endnotes() {
        let html = r#"<html><body>
<div class="hpa" style="width:200mm;height:100mm;">
<div class="hls" style="left:10mm;top:20mm;height:5mm"><span class="cs0">1)</span></div>
<div class="hls" style="left:10mm;top:26mm;height:5mm"><span class="cs0">정답 3</span></div>
<div class="hls" style="left:10mm;top:32mm;height:5mm"><span class="cs0">2)</span></div>
<div class="hls" style="left:10mm;top:38mm;height:5mm"><span class="cs0">정답 5</span></div>
</div>
<div class="hpa" style="width:200mm;height:100mm;"><p>no answers</p></div>
</body></html>"#;
        let result = PageExtractor::new(html).extract_endnotes();
        assert_eq!(result.positions.len(), 1);
        assert_eq!(result.endnotes.len(), 1);
        assert_eq!(result.positions[0].len(), 2);
        assert_eq!(result.endnote_count(), 2);
        assert!(result.endnotes[0][0].contains("정답 3"));
        assert!(result.endnotes[0][1].contains("정답 5"));
    }

    #[test]
    fn test_endnote_without_span_stays_aligned() {
        let html = r#"<html><body>
<div class="hpa" style="width:200mm;height:100mm;">
<div class="hls" style="left:10mm;top:20mm;height:5mm"><span class="cs0">1)</span></div>
<div class="hls" style="left:10mm;top:26mm;height:5mm"><span class="cs0">정답 3</span></div>
<div class="hls" style="left:10mm;top:32mm;height:5mm">2)</div>
<div class="hls" style="left:10mm;top:38mm;height:5mm"><span class="cs0">정답 5</span></div>
</div>
</body></html>"#;
        let result = PageExtractor::new(html).extract_endnotes();
        assert_eq!(result.page_count(), 1);
        assert_eq!(result.positions[0].len(), 2);
        assert_eq!(result.endnotes[0].len(), 2);
        assert!(result.endnotes[0][1].contains("정답 5"));
    }

    #[test]
    fn test_low_repeat_threshold_still_closes_fragment() {
        let html = r#"<html><body><div class="hpa" style="width:210mm;height:297mm;"><div class="hhe">1) a</div><div class="hls ps4"></div><div class="hls ps4"></div><div class="hls ps4"></div><div class="hls ps4"></div><div class="hls">FOOTER</div></div></body></html>"#;
        let default = PageExtractor::new(html).extract_pages();
        assert_eq!(default.pages, vec![vec!["1) a".to_string()]]);

        let options = ExtractOptions::new().with_repeat_threshold(3);
        let result = PageExtractor::with_options(html, options).extract_pages();
        assert_eq!(result.pages, vec![vec!["1) a".to_string()]]);
    }
}
