//! Markup serialization for arena trees.
//!
//! Text is written as-is (entities stay decoded) and the class list is
//! always the first attribute, so the output of a fragment is stable across
//! repeated normalization.

use crate::model::{ElementData, HtmlTree, NodeData, NodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Opening tag of an element, e.g. `<div class="hhe">`.
pub fn open_tag(element: &ElementData) -> String {
    let mut out = String::new();
    write_open_tag(element, &mut out);
    out
}

/// Serialize a node and its subtree.
pub fn serialize(tree: &HtmlTree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, &mut out);
    out
}

/// Serialize the children of a node, without the node's own tags.
pub fn serialize_children(tree: &HtmlTree, id: NodeId) -> String {
    let mut out = String::new();
    for &child in tree.children(id) {
        write_node(tree, child, &mut out);
    }
    out
}

fn write_open_tag(element: &ElementData, out: &mut String) {
    out.push('<');
    out.push_str(&element.tag);
    if !element.classes.is_empty() {
        out.push_str(" class=\"");
        out.push_str(&element.class_key());
        out.push('"');
    }
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    if is_void(&element.tag) {
        out.push('/');
    }
    out.push('>');
}

fn write_node(tree: &HtmlTree, id: NodeId, out: &mut String) {
    match tree.data(id) {
        NodeData::Text(text) => out.push_str(text),
        NodeData::Root => {
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
        }
        NodeData::Element(element) => {
            write_open_tag(element, out);
            if is_void(&element.tag) {
                return;
            }
            for &child in tree.children(id) {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(&element.tag);
            out.push('>');
        }
    }
}

fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(tag))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    #[test]
    fn test_open_tag() {
        let el = ElementData::new("div")
            .with_class("hhe")
            .with_attr("style", "top:1mm");
        assert_eq!(open_tag(&el), r#"<div class="hhe" style="top:1mm">"#);
        assert_eq!(open_tag(&ElementData::new("br")), "<br/>");
    }

    #[test]
    fn test_serialize_roundtrip_shape() {
        let tree = parse_html(r#"<body><div class="a"><p>x &lt; y<br>z</p></div></body>"#);
        let body = tree.body();
        assert_eq!(
            serialize_children(&tree, body),
            r#"<div class="a"><p>x < y<br/>z</p></div>"#
        );
        let div = tree.element_children(body).next().unwrap();
        assert!(serialize(&tree, div).starts_with(r#"<div class="a">"#));
    }
}
