//! Problem region geometry.
//!
//! Every box in the converted markup is positioned relative to its parent, so
//! absolute placement is recovered by summing offsets up to the page
//! container. The right edge comes from the widest following sibling of the
//! problem's line, and the bottom edge from the first run of stop markers
//! after it.

use crate::model::{BoundingBox, HtmlTree, NodeId, PageDimensions, StopMarkerClass};
use crate::parser::{page_dimensions, parse_style, parse_style_absolute, ExtractOptions};

/// Computes page-relative bounding boxes for problem markers.
pub struct CoordinateAccumulator<'a> {
    tree: &'a HtmlTree,
    stop_markers: &'a [StopMarkerClass],
    stop_run_length: usize,
    bottom_allowance_mm: f64,
}

impl<'a> CoordinateAccumulator<'a> {
    /// Create an accumulator over `tree` using the document's stop markers.
    pub fn new(
        tree: &'a HtmlTree,
        stop_markers: &'a [StopMarkerClass],
        options: &ExtractOptions,
    ) -> Self {
        Self {
            tree,
            stop_markers,
            stop_run_length: options.stop_run_length,
            bottom_allowance_mm: options.bottom_allowance_mm,
        }
    }

    /// Dimensions of a page container.
    pub fn page_dimensions(&self, page: NodeId) -> PageDimensions {
        self.tree
            .element(page)
            .map(|el| page_dimensions(el.style()))
            .unwrap_or_default()
    }

    /// Bounding box of every `problem_class` marker on a page, in document order.
    pub fn page_positions(&self, page: NodeId, problem_class: &str) -> Vec<BoundingBox> {
        let dims = self.page_dimensions(page);
        problem_markers(self.tree, page, problem_class)
            .into_iter()
            .map(|problem| self.bounding_box(problem, dims))
            .collect()
    }

    /// Absolute `(left, top)` of an element in millimetres.
    ///
    /// Offsets of the element and all its ancestors up to (not including)
    /// `<body>` are summed. Percentages resolve against the page.
    pub fn absolute_position(&self, element: NodeId, page: PageDimensions) -> (f64, f64) {
        std::iter::once(element)
            .chain(self.tree.ancestors(element))
            .map_while(|id| self.tree.element(id).filter(|el| !el.is("body")))
            .map(|el| parse_style(el.style(), page))
            .fold((0.0, 0.0), |(left, top), b| (left + b.left, top + b.top))
    }

    /// Bounding box of one problem marker.
    pub fn bounding_box(&self, problem: NodeId, page: PageDimensions) -> BoundingBox {
        let (left, top) = self.absolute_position(problem, page);

        let Some(parent) = self.tree.parent(problem) else {
            return BoundingBox::from_mm(page, left, top, left, self.bottom_allowance_mm);
        };

        let parent_box = self
            .tree
            .element(parent)
            .map(|el| parse_style(el.style(), page))
            .unwrap_or_default();

        let right = self
            .tree
            .following_element_siblings(parent)
            .filter_map(|s| self.tree.element(s))
            .map(|el| left + parse_style(el.style(), page).right())
            .fold(left + parent_box.width, f64::max);

        let bottom = self.bottom_allowance_mm + self.bottom_offset(parent);

        BoundingBox::from_mm(page, left, top, right, bottom)
    }

    /// `top` of the first element of the first stop-marker run after `start`.
    ///
    /// Returns 0 when no run of `stop_run_length` follows.
    pub fn bottom_offset(&self, start: NodeId) -> f64 {
        let mut counts = vec![0usize; self.stop_markers.len()];
        let mut firsts: Vec<Option<NodeId>> = vec![None; self.stop_markers.len()];

        for sibling in self.tree.following_element_siblings(start) {
            let Some(el) = self.tree.element(sibling) else {
                continue;
            };
            match self.stop_markers.iter().position(|m| m.matches(el)) {
                Some(k) => {
                    if counts[k] == 0 {
                        firsts[k] = Some(sibling);
                    }
                    counts[k] += 1;
                    if counts[k] >= self.stop_run_length {
                        return firsts[k]
                            .and_then(|first| self.tree.element(first))
                            .map(|first| parse_style_absolute(first.style()).top)
                            .unwrap_or(0.0);
                    }
                }
                None => {
                    counts.iter_mut().for_each(|c| *c = 0);
                    firsts.iter_mut().for_each(|f| *f = None);
                }
            }
        }

        0.0
    }
}

/// Elements below `page` carrying `problem_class`, in document order.
pub fn problem_markers(tree: &HtmlTree, page: NodeId, problem_class: &str) -> Vec<NodeId> {
    tree.element_descendants(page)
        .filter(|&id| {
            tree.element(id)
                .is_some_and(|el| el.is("div") && el.has_class(problem_class))
        })
        .collect()
}
