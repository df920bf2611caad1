//! Page segmentation into problem fragments.
//!
//! A page is flattened into open/text/close tokens. Each fragment starts at a
//! problem marker and runs until a run of empty stop-marker elements, the
//! next problem marker, or the end of the page. The token slice is then
//! rebuilt into its own tree, dropping closes whose opens fell outside the
//! slice and closing whatever is still open at the end.

use crate::model::{HtmlTree, NodeId, StopMarkerClass};
use crate::parser::ExtractOptions;

/// One problem's markup, detached from the page it came from.
#[derive(Debug, Clone)]
pub struct ProblemFragment {
    /// Rebuilt markup of the fragment
    pub tree: HtmlTree,
    /// The problem marker element inside `tree`
    pub marker: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Open(NodeId),
    Close(NodeId),
    Text(NodeId),
}

/// Splits page containers into per-problem fragments.
pub struct PageSegmenter<'a> {
    stop_markers: &'a [StopMarkerClass],
    options: &'a ExtractOptions,
}

impl<'a> PageSegmenter<'a> {
    /// Create a segmenter using the document's stop markers.
    pub fn new(stop_markers: &'a [StopMarkerClass], options: &'a ExtractOptions) -> Self {
        Self {
            stop_markers,
            options,
        }
    }

    /// Strip formatting wrappers and decorative containers from a page.
    ///
    /// Spans are unwrapped, paragraph attributes and classes cleared, and containers
    /// whose only class is the ignore class are removed when they hold no
    /// visible text and no problem marker.
    pub fn clean_page(&self, tree: &mut HtmlTree, page: NodeId) {
        let elements: Vec<NodeId> = tree.element_descendants(page).collect();
        for id in elements {
            let Some(el) = tree.element(id) else {
                continue;
            };
            if el.is("span") {
                tree.unwrap(id);
            } else if el.is("p") {
                if let Some(el) = tree.element_mut(id) {
                    el.attrs.clear();
                    el.classes.clear();
                }
            } else if el.is("div")
                && el.classes.len() == 1
                && el.classes[0] == self.options.ignore_class
                && tree.text_content(id).trim().is_empty()
                && !self.contains_marker(tree, id)
            {
                tree.detach(id);
            }
        }
    }

    /// Split a (cleaned) page into problem fragments in document order.
    pub fn segment(&self, tree: &HtmlTree, page: NodeId) -> Vec<ProblemFragment> {
        let tokens = tokenize(tree, page);
        let mut fragments = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let Token::Open(start) = tokens[i] else {
                i += 1;
                continue;
            };
            if !self.is_marker(tree, start) {
                i += 1;
                continue;
            }

            let mut end = tokens.len();
            for j in i + 1..tokens.len() {
                if matches!(tokens[j], Token::Open(id) if self.is_marker(tree, id))
                    || self.stop_run_at(tree, &tokens, j)
                {
                    end = j;
                    break;
                }
            }
            if end == tokens.len() {
                log::debug!("Problem fragment runs to the end of the page");
            }

            fragments.push(rebuild(tree, &tokens[i..end], start));
            i = end.max(i + 1);
        }

        fragments
    }

    fn is_marker(&self, tree: &HtmlTree, id: NodeId) -> bool {
        tree.element(id)
            .is_some_and(|el| el.is("div") && el.has_class(&self.options.problem_class))
    }

    fn contains_marker(&self, tree: &HtmlTree, id: NodeId) -> bool {
        self.is_marker(tree, id)
            || tree
                .element_descendants(id)
                .any(|d| self.is_marker(tree, d))
    }

    /// Whether `stop_run_length` empty elements of one stop class start at `pos`.
    fn stop_run_at(&self, tree: &HtmlTree, tokens: &[Token], pos: usize) -> bool {
        let Token::Open(first) = tokens[pos] else {
            return false;
        };
        let Some(marker) = self.empty_stop_marker(tree, first) else {
            return false;
        };

        let mut pos = pos;
        for n in 0..self.options.stop_run_length {
            if n > 0 {
                pos = skip_blank_text(tree, tokens, pos);
            }
            match tokens.get(pos..pos + 2) {
                Some(&[Token::Open(a), Token::Close(b)])
                    if a == b && self.empty_stop_marker(tree, a) == Some(marker) => {}
                _ => return false,
            }
            pos += 2;
        }
        true
    }

    fn empty_stop_marker(&self, tree: &HtmlTree, id: NodeId) -> Option<usize> {
        let el = tree.element(id)?;
        if !el.is("div") || !tree.children(id).is_empty() {
            return None;
        }
        self.stop_markers.iter().position(|m| m.matches(el))
    }
}

/// Trim runs of empty stop-marker siblings so at most `keep` remain.
pub fn trim_stop_runs(
    tree: &mut HtmlTree,
    root: NodeId,
    stop_markers: &[StopMarkerClass],
    keep: usize,
    protected_class: &str,
) {
    let mut removed = Vec::new();
    let parents: Vec<NodeId> = std::iter::once(root)
        .chain(tree.element_descendants(root))
        .collect();

    for parent in parents {
        let mut run: Option<(usize, usize)> = None;
        for child in tree.element_children(parent) {
            let Some(el) = tree.element(child) else {
                continue;
            };
            let marker = (!tree.has_element_children(child) && !el.has_class(protected_class))
                .then(|| stop_markers.iter().position(|m| m.matches(el)))
                .flatten();
            run = match (marker, run) {
                (Some(k), Some((current, count))) if k == current => Some((k, count + 1)),
                (Some(k), _) => Some((k, 1)),
                (None, _) => None,
            };
            if matches!(run, Some((_, count)) if count > keep) {
                removed.push(child);
            }
        }
    }

    if !removed.is_empty() {
        log::debug!("Trimmed {} repeated stop-marker elements", removed.len());
    }
    for id in removed {
        tree.detach(id);
    }
}

/// Top-level page containers under `body`, 1-indexed.
pub fn page_containers(tree: &HtmlTree, body: NodeId) -> Vec<(u32, NodeId)> {
    tree.element_children(body)
        .filter(|&id| tree.element(id).is_some_and(|el| el.is("div")))
        .enumerate()
        .map(|(i, id)| (i as u32 + 1, id))
        .collect()
}

fn skip_blank_text(tree: &HtmlTree, tokens: &[Token], mut pos: usize) -> usize {
    while let Some(Token::Text(id)) = tokens.get(pos) {
        if !tree.text(*id).is_some_and(|t| t.trim().is_empty()) {
            break;
        }
        pos += 1;
    }
    pos
}

fn tokenize(tree: &HtmlTree, root: NodeId) -> Vec<Token> {
    enum Step {
        Enter(NodeId),
        Leave(NodeId),
    }

    let mut tokens = Vec::new();
    let mut stack: Vec<Step> = tree.children(root).iter().rev().map(|&c| Step::Enter(c)).collect();
    while let Some(step) = stack.pop() {
        match step {
            Step::Enter(id) if tree.text(id).is_some() => tokens.push(Token::Text(id)),
            Step::Enter(id) => {
                tokens.push(Token::Open(id));
                stack.push(Step::Leave(id));
                stack.extend(tree.children(id).iter().rev().map(|&c| Step::Enter(c)));
            }
            Step::Leave(id) => tokens.push(Token::Close(id)),
        }
    }
    tokens
}

fn rebuild(source: &HtmlTree, tokens: &[Token], marker: NodeId) -> ProblemFragment {
    let mut tree = HtmlTree::new();
    let mut stack: Vec<(NodeId, NodeId)> = Vec::new();
    let mut marker_id = tree.root();

    for token in tokens {
        let parent = stack.last().map_or(tree.root(), |&(_, new)| new);
        match *token {
            Token::Open(id) => {
                let element = source.element(id).cloned().unwrap_or_default();
                let new = tree.append_element(parent, element);
                if id == marker {
                    marker_id = new;
                }
                stack.push((id, new));
            }
            Token::Close(id) => {
                if let Some(pos) = stack.iter().rposition(|&(src, _)| src == id) {
                    stack.truncate(pos);
                }
            }
            Token::Text(id) => {
                if let Some(text) = source.text(id) {
                    tree.append_text(parent, text);
                }
            }
        }
    }

    ProblemFragment {
        tree,
        marker: marker_id,
    }
}
