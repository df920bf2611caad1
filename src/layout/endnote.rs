//! Endnote (answer sheet) layout.
//!
//! Answer pages carry no problem markers; each answer is a run of line
//! containers starting with a numbered line such as `12)`. Line extents are
//! not written by the converter, so widths are estimated per character.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{BoundingBox, HtmlTree, NodeId, PageDimensions};
use crate::parser::{page_dimensions, parse_style, parse_style_absolute};

/// Estimated width of a space, in millimetres.
pub const SPACE_WIDTH: f64 = 1.17;
/// Estimated width of a letter or digit.
pub const CHAR_WIDTH: f64 = 3.457839105;
/// Estimated width of any other symbol.
pub const SYMBOL_WIDTH: f64 = 0.85;

/// Spacing added below every line.
const LINE_GAP: f64 = 1.77;
/// Trim applied to an answer that is followed by another answer.
const INTERIOR_TRIM: f64 = 8.0;
/// Trim applied to the last answer of a page.
const FINAL_TRIM: f64 = 4.0;

/// Span class the converter uses for zero-size text.
const HIDDEN_SPAN_CLASS: &str = "cs2";

fn numbered_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\)").expect("valid numbered item regex"))
}

/// Whether a line starts a numbered item (`3)`, `12)`).
pub fn is_numbered_item(line: &str) -> bool {
    numbered_item().is_match(line)
}

/// Locates numbered answers on endnote pages.
pub struct EndnoteLocator<'a> {
    tree: &'a HtmlTree,
    line_class: &'a str,
}

struct OpenItem {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl<'a> EndnoteLocator<'a> {
    /// Create a locator for line containers with `line_class`.
    pub fn new(tree: &'a HtmlTree, line_class: &'a str) -> Self {
        Self { tree, line_class }
    }

    /// Bounding boxes of the numbered answers on one page.
    pub fn page_positions(&self, page: NodeId) -> Vec<BoundingBox> {
        let dims = self
            .tree
            .element(page)
            .map(|el| page_dimensions(el.style()))
            .unwrap_or_default();

        let lines: Vec<NodeId> = self
            .tree
            .element_descendants(page)
            .filter(|&id| {
                self.tree
                    .element(id)
                    .is_some_and(|el| el.is("div") && el.has_class(self.line_class))
            })
            .collect();

        let mut boxes = Vec::new();
        let mut current: Option<OpenItem> = None;

        for line in lines {
            if self.starts_item(line) {
                if let Some(item) = current.take() {
                    boxes.push(finish(item, INTERIOR_TRIM, dims));
                }
                let (left, top) = self.accumulated_origin(line, dims);
                current = Some(OpenItem {
                    left,
                    top,
                    width: 0.0,
                    height: 0.0,
                });
            }
            if let Some(item) = current.as_mut() {
                item.width = item.width.max(self.line_width(line));
                item.height += self.line_height(line) + LINE_GAP;
            }
        }
        if let Some(item) = current {
            boxes.push(finish(item, FINAL_TRIM, dims));
        }

        boxes
    }

    /// Whether any text node of a line opens a numbered item.
    ///
    /// Text nodes are what [`text_lines`] splits on, so regions and items
    /// start at the same lines.
    fn starts_item(&self, line: NodeId) -> bool {
        self.tree
            .text_nodes(line)
            .into_iter()
            .filter_map(|id| self.tree.text(id))
            .any(is_numbered_item)
    }

    /// Absolute top-left of a line in millimetres, shifted down by the
    /// first non-zero height on the ancestor chain.
    fn accumulated_origin(&self, line: NodeId, dims: PageDimensions) -> (f64, f64) {
        let mut left = 0.0;
        let mut top = 0.0;
        let mut first_height = 0.0;
        for id in std::iter::once(line).chain(self.tree.ancestors(line)) {
            let Some(el) = self.tree.element(id) else {
                continue;
            };
            if el.style().is_empty() {
                continue;
            }
            let b = parse_style(el.style(), dims);
            left += b.left;
            top += b.top;
            if first_height == 0.0 {
                first_height = b.height;
            }
        }
        (left, top + first_height)
    }

    fn line_height(&self, line: NodeId) -> f64 {
        self.tree
            .element(line)
            .map(|el| parse_style_absolute(el.style()).height)
            .unwrap_or(0.0)
    }

    /// Estimated printed width of a line.
    fn line_width(&self, line: NodeId) -> f64 {
        let mut total = 0.0;
        for id in self.tree.element_descendants(line) {
            let Some(el) = self.tree.element(id) else {
                continue;
            };
            let declared = el
                .style()
                .contains("width:")
                .then(|| parse_style_absolute(el.style()).width);
            if el.is("span") {
                total += match declared {
                    Some(width) => width,
                    None if el.has_class(HIDDEN_SPAN_CLASS) => 0.0,
                    None => estimate_text_width(&self.tree.text_content(id)),
                };
            } else if el.is("div") {
                if let Some(width) = declared {
                    total += width + SPACE_WIDTH;
                }
            }
        }
        total
    }
}

/// Per-character width estimate of `text` in millimetres.
pub fn estimate_text_width(text: &str) -> f64 {
    text.chars()
        .map(|c| {
            if c.is_whitespace() {
                SPACE_WIDTH
            } else if c.is_alphanumeric() {
                CHAR_WIDTH
            } else {
                SYMBOL_WIDTH
            }
        })
        .sum()
}

fn finish(item: OpenItem, trim: f64, dims: PageDimensions) -> BoundingBox {
    if dims.is_degenerate() {
        return BoundingBox::default();
    }
    let height = item.height - trim;
    BoundingBox::from_mm(
        dims,
        item.left,
        item.top,
        item.left + item.width,
        item.top + height,
    )
}

/// Split flattened page lines into numbered items.
///
/// Lines before the first numbered line are dropped; each item keeps the
/// lines after its numbering line, joined with `\n`.
pub fn split_numbered_items<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut items: Vec<Vec<&str>> = Vec::new();
    for line in lines {
        let line = line.as_ref();
        if is_numbered_item(line) {
            items.push(vec![line]);
        } else if let Some(item) = items.last_mut() {
            item.push(line);
        }
    }
    items.into_iter().map(|item| item[1..].join("\n")).collect()
}

/// Text of every text node below `root`, in document order.
///
/// Nodes are not joined, so a numbering span stays its own line even after
/// its wrapper has been unwrapped.
pub fn text_lines(tree: &HtmlTree, root: NodeId) -> Vec<String> {
    tree.text_nodes(root)
        .into_iter()
        .filter_map(|id| tree.text(id))
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    #[test]
    fn test_numbered_items() {
        assert!(is_numbered_item("12) 정답"));
        assert!(!is_numbered_item(" 1)"));
        assert!(!is_numbered_item("(1)"));
    }

    #[test]
    fn test_split_numbered_items() {
        let lines = ["header", "1)", "a", "b", "2)", "c"];
        assert_eq!(split_numbered_items(&lines), vec!["a\nb", "c"]);
        assert!(split_numbered_items::<&str>(&[]).is_empty());
    }

    #[test]
    fn test_estimate_text_width() {
        let w = estimate_text_width("a1 +");
        assert!((w - (2.0 * CHAR_WIDTH + SPACE_WIDTH + SYMBOL_WIDTH)).abs() < 1e-9);
        assert!((estimate_text_width("정답") - 2.0 * CHAR_WIDTH).abs() < 1e-9);
    }

    #[test]
    fn test_text_lines() {
        let mut tree = parse_html("<body><div><span>1)</span><span>a</span><p>x</p>y</div></body>");
        let body = tree.body();
        let spans: Vec<NodeId> = tree
            .element_descendants(body)
            .filter(|&id| tree.element(id).is_some_and(|el| el.is("span")))
            .collect();
        for span in spans {
            tree.unwrap(span);
        }
        assert_eq!(text_lines(&tree, body), vec!["1)", "a", "x", "y"]);
    }

    #[test]
    fn test_page_positions() {
        let tree = parse_html(
            r#"<body><div style="width:200mm;height:100mm">
<div class="hls" style="left:10mm;top:20mm;height:5mm"><span class="cs0">1)</span><span class="cs2">hidden</span></div>
<div class="hls" style="left:10mm;top:26mm;height:5mm"><span class="cs0" style="width:30mm">eq</span></div>
<div class="hls" style="left:10mm;top:40mm;height:5mm"><span class="cs0">2)</span></div>
</div></body>"#,
        );
        let page = tree.element_children(tree.body()).next().unwrap();
        let boxes = EndnoteLocator::new(&tree, "hls").page_positions(page);
        assert_eq!(boxes.len(), 2);

        let first = boxes[0];
        assert!((first.left - 0.05).abs() < 1e-9);
        // top 20 plus the line's own height
        assert!((first.top - 0.25).abs() < 1e-9);
        assert!((first.right - (10.0 + 30.0) / 200.0).abs() < 1e-9);
        let height = 2.0 * (5.0 + LINE_GAP) - INTERIOR_TRIM;
        assert!((first.bottom - (25.0 + height) / 100.0).abs() < 1e-9);

        let bare = parse_html(
            r#"<body><div style="width:200mm;height:100mm"><div class="hls" style="height:5mm"><span>1)</span></div><div class="hls" style="height:5mm">2)</div></div></body>"#,
        );
        let page = bare.element_children(bare.body()).next().unwrap();
        assert_eq!(EndnoteLocator::new(&bare, "hls").page_positions(page).len(), 2);

        let second = boxes[1];
        let width = estimate_text_width("2)");
        assert!((second.right - (10.0 + width) / 200.0).abs() < 1e-9);
        let height = 5.0 + LINE_GAP - FINAL_TRIM;
        assert!((second.bottom - (45.0 + height) / 100.0).abs() < 1e-9);
    }
}
