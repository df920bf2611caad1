//! Converted-document markup parsing.
//!
//! `scraper` (html5ever) does the tokenizing and tree repair; the result is
//! copied into an [`HtmlTree`] arena that the layout passes can mutate.

use scraper::{ElementRef, Html, Node};

use crate::model::{ElementData, HtmlTree, NodeId};

/// Parse a full HTML document into an arena tree.
pub fn parse_html(markup: &str) -> HtmlTree {
    let document = Html::parse_document(markup);
    let mut tree = HtmlTree::new();
    let root = tree.root();
    let html = document.root_element();
    let html_id = tree.append_element(root, element_data(&html));

    let mut stack: Vec<(ElementRef<'_>, NodeId)> = vec![(html, html_id)];
    while let Some((element, id)) = stack.pop() {
        let mut pending = Vec::new();
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    tree.append_text(id, text);
                }
                Node::Element(_) => {
                    if let Some(child_element) = ElementRef::wrap(child) {
                        let child_id = tree.append_element(id, element_data(&child_element));
                        pending.push((child_element, child_id));
                    }
                }
                _ => {}
            }
        }
        stack.extend(pending.into_iter().rev());
    }

    if !document.errors.is_empty() {
        log::debug!("Markup repaired with {} parse errors", document.errors.len());
    }

    tree
}

fn element_data(element: &ElementRef<'_>) -> ElementData {
    let value = element.value();
    let mut data = ElementData::new(value.name());
    if let Some(class) = value.attr("class") {
        data = data.with_class(class);
    }
    for (name, attr_value) in value.attrs() {
        if !name.eq_ignore_ascii_case("class") {
            data.attrs.push((name.to_string(), attr_value.to_string()));
        }
    }
    data
}
