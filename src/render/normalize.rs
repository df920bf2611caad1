//! Problem fragment normalization.
//!
//! Passes run in a fixed order over the fragment's own tree: attribute
//! stripping, empty-container pruning, image collapsing, whitespace
//! unification, placeholder-wrapper collapsing. The serialized result then
//! gets its math spans repaired.

use crate::layout::ProblemFragment;
use crate::model::{HtmlTree, NodeId};
use crate::parser::parse_html;

use super::math::strip_math_line_breaks;
use super::serialize::serialize_children;

/// Attributes that carry layout or identity but no content.
const STRIPPED_ATTRIBUTES: &[&str] = &[
    "style",
    "src",
    "alt",
    "border",
    "data-formula-baseunit",
    "data-formula-color",
    "data-formula-linemode",
    "height",
    "hspace",
    "vspace",
    "width",
    "viewbox",
    "d",
    "id",
    "fill",
    "x",
    "y",
    "patternunits",
    "xlink",
    "preserveaspectratio",
    "patterncontentunits",
];

/// Whitespace variants unified to an ASCII space.
pub const UNICODE_SPACES: &[char] = &[
    '\u{0020}', '\u{00A0}', '\u{0009}', '\u{000A}', '\u{000B}', '\u{000C}', '\u{000D}', '\u{1680}',
    '\u{2000}', '\u{2001}', '\u{2002}', '\u{2003}', '\u{2004}', '\u{2005}', '\u{2006}', '\u{2007}',
    '\u{2008}', '\u{2009}', '\u{200A}', '\u{200B}', '\u{200C}', '\u{200D}', '\u{2028}', '\u{2029}',
    '\u{202F}', '\u{205F}', '\u{3000}', '\u{FEFF}',
];

/// Flattens problem markup to placeholder-bearing text.
#[derive(Debug, Clone)]
pub struct ContentNormalizer {
    placeholder: String,
}

impl ContentNormalizer {
    /// Create a normalizer substituting images with `placeholder`.
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
        }
    }

    /// The image placeholder token.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Normalize a problem fragment.
    ///
    /// The problem marker's own tags are dropped; its content and everything
    /// after it are kept.
    pub fn normalize_fragment(&self, mut fragment: ProblemFragment) -> String {
        if fragment.marker != fragment.tree.root() {
            fragment.tree.unwrap(fragment.marker);
        }
        let root = fragment.tree.root();
        self.normalize_tree(&mut fragment.tree, root);
        self.render(&fragment.tree, root)
    }

    /// Normalize a markup string (e.g. a previously normalized fragment).
    pub fn normalize_markup(&self, markup: &str) -> String {
        let mut tree = parse_html(markup);
        let body = tree.body();
        self.normalize_tree(&mut tree, body);
        self.render(&tree, body)
    }

    /// Run every tree pass below `root`, in order.
    pub fn normalize_tree(&self, tree: &mut HtmlTree, root: NodeId) {
        strip_attributes(tree, root);
        self.prune_empty(tree, root);
        self.collapse_images(tree, root);
        unify_text_whitespace(tree, root);
        self.collapse_placeholder_wrappers(tree, root);
    }

    /// Serialize the children of `root` and repair math spans.
    pub fn render(&self, tree: &HtmlTree, root: NodeId) -> String {
        strip_math_line_breaks(&serialize_children(tree, root))
    }

    /// Remove `div`/`path` subtrees with no text, no kept style and no image.
    pub fn prune_empty(&self, tree: &mut HtmlTree, root: NodeId) {
        let candidates: Vec<NodeId> = tree
            .element_descendants(root)
            .filter(|&id| {
                tree.element(id)
                    .is_some_and(|el| el.is("div") || el.is("path"))
            })
            .collect();

        for id in candidates {
            if tree.is_attached(id) && !should_keep(tree, id) {
                tree.detach(id);
            }
        }
    }

    /// Replace image-bearing elements with the placeholder token.
    pub fn collapse_images(&self, tree: &mut HtmlTree, root: NodeId) {
        let images: Vec<NodeId> = tree
            .element_descendants(root)
            .filter(|&id| {
                tree.element(id).is_some_and(|el| {
                    (el.is("div") && el.style().contains("url"))
                        || el.is("img")
                        || el.is("image")
                })
            })
            .collect();

        for id in images {
            if tree.is_attached(id) {
                tree.replace_with_text(id, &self.placeholder);
            }
        }
    }

    /// Collapse `div`s whose only visible text is the placeholder.
    pub fn collapse_placeholder_wrappers(&self, tree: &mut HtmlTree, root: NodeId) {
        let wrappers: Vec<NodeId> = tree
            .element_descendants(root)
            .filter(|&id| tree.element(id).is_some_and(|el| el.is("div")))
            .collect();

        for id in wrappers {
            if tree.is_attached(id) && stripped_text(tree, id) == self.placeholder {
                tree.replace_with_text(id, &self.placeholder);
            }
        }
    }
}

impl Default for ContentNormalizer {
    fn default() -> Self {
        Self::new("[image]")
    }
}

/// Drop non-content attributes from every element below `root`.
///
/// Styles referencing an image keep only their `background-image` parts.
pub fn strip_attributes(tree: &mut HtmlTree, root: NodeId) {
    let elements: Vec<NodeId> = tree.element_descendants(root).collect();
    for id in elements {
        let Some(el) = tree.element_mut(id) else {
            continue;
        };
        let style = el.style().to_string();
        el.attrs.retain(|(name, _)| {
            !STRIPPED_ATTRIBUTES
                .iter()
                .any(|a| a.eq_ignore_ascii_case(name))
        });
        if style.contains("url") {
            let kept: String = style
                .split(';')
                .filter(|part| part.contains("background-image"))
                .map(|part| format!("{};", part))
                .collect();
            el.set_attr("style", kept);
        }
    }
}

/// Map every whitespace variant to an ASCII space.
pub fn unify_whitespace(text: &str) -> String {
    text.chars()
        .map(|c| if UNICODE_SPACES.contains(&c) { ' ' } else { c })
        .collect()
}

fn unify_text_whitespace(tree: &mut HtmlTree, root: NodeId) {
    for id in tree.text_nodes(root) {
        if let Some(text) = tree.text_mut(id) {
            if text.contains(UNICODE_SPACES) {
                *text = unify_whitespace(text);
            }
        }
    }
}

/// Text of all descendants, each piece trimmed, concatenated.
fn stripped_text(tree: &HtmlTree, id: NodeId) -> String {
    tree.text_nodes(id)
        .into_iter()
        .filter_map(|t| tree.text(t))
        .map(str::trim)
        .collect()
}

fn should_keep(tree: &HtmlTree, id: NodeId) -> bool {
    let Some(el) = tree.element(id) else {
        return false;
    };
    if !el.style().is_empty() || el.is("img") || el.is("image") {
        return true;
    }
    if tree
        .text_nodes(id)
        .iter()
        .any(|&t| tree.text(t).is_some_and(|s| !s.trim().is_empty()))
    {
        return true;
    }
    tree.element_children(id).any(|child| should_keep(tree, child))
}
