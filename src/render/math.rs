//! Inline math handling.
//!
//! The document converter replaces every equation with an opaque identifier
//! and reports the identifier-to-equation map separately. Identifiers are
//! wrapped as `$id$` inside the markup so the spans survive normalization.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{HtmlTree, NodeId};

/// Equation identifiers and their source notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EquationMap {
    entries: BTreeMap<String, String>,
}

impl EquationMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an identifier.
    pub fn insert(&mut self, id: impl Into<String>, equation: impl Into<String>) {
        self.entries.insert(id.into(), equation.into());
    }

    /// Parse either a bare `{id: equation}` object or a
    /// `{"file_name": ..., "uuid_to_eqn": {...}}` record.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = match value.get("uuid_to_eqn") {
            Some(inner) => inner,
            None => &value,
        };
        let object = object
            .as_object()
            .ok_or_else(|| Error::InvalidEquationMap("expected a JSON object".to_string()))?;

        let mut map = Self::new();
        for (id, equation) in object {
            let equation = equation.as_str().ok_or_else(|| {
                Error::InvalidEquationMap(format!("equation for '{}' is not a string", id))
            })?;
            map.insert(id.clone(), equation);
        }
        Ok(map)
    }

    /// Number of identifiers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifiers in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Wrap every identifier occurrence in `text` as `$id$`.
    pub fn delimit(&self, text: &str) -> String {
        let mut result = text.to_string();
        for id in self.ids().filter(|id| !id.is_empty()) {
            if result.contains(id) {
                result = result.replace(id, &format!("${}$", id));
            }
        }
        result
    }

    /// Replace identifiers with their equations.
    pub fn restore(&self, text: &str) -> String {
        let mut result = text.to_string();
        for (id, equation) in self.entries.iter().filter(|(id, _)| !id.is_empty()) {
            result = result.replace(id.as_str(), equation);
        }
        result
    }
}

/// Wrap equation identifiers in every text node below `root`.
pub fn delimit_equations(tree: &mut HtmlTree, root: NodeId, equations: &EquationMap) {
    if equations.is_empty() {
        return;
    }
    for id in tree.text_nodes(root) {
        if let Some(text) = tree.text_mut(id) {
            let delimited = equations.delimit(text);
            if delimited != *text {
                *text = delimited;
            }
        }
    }
}

/// Remove line breaks that fall inside `$...$` spans.
///
/// An unpaired trailing `$` does not open a span.
pub fn strip_math_line_breaks(text: &str) -> String {
    let parts: Vec<&str> = text.split('$').collect();
    let n = parts.len();
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i % 2 == 1 && i + 1 < n {
                part.replace(['\r', '\n'], "")
            } else {
                (*part).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("$")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    #[test]
    fn test_strip_math_line_breaks() {
        assert_eq!(
            strip_math_line_breaks("$a\nb$ text\nmore"),
            "$ab$ text\nmore"
        );
        assert_eq!(strip_math_line_breaks("$x\r\ny$ and $p\nq"), "$xy$ and $p\nq");
        assert_eq!(strip_math_line_breaks("no math\n"), "no math\n");
    }

    #[test]
    fn test_equation_map_formats() {
        let bare = EquationMap::from_json(r#"{"ID1":"x^2"}"#).unwrap();
        assert_eq!(bare.len(), 1);

        let record =
            EquationMap::from_json(r#"{"file_name":"a","uuid_to_eqn":{"ID1":"x^2","ID2":"y"}}"#)
                .unwrap();
        assert_eq!(record.len(), 2);

        assert!(matches!(
            EquationMap::from_json("[1,2]"),
            Err(Error::InvalidEquationMap(_))
        ));
        assert!(matches!(
            EquationMap::from_json(r#"{"ID1":3}"#),
            Err(Error::InvalidEquationMap(_))
        ));
    }

    #[test]
    fn test_delimit_and_restore() {
        let mut map = EquationMap::new();
        map.insert("EQ01", "a over b");
        let delimited = map.delimit("value EQ01 here");
        assert_eq!(delimited, "value $EQ01$ here");
        assert_eq!(map.restore(&delimited), "value $a over b$ here");
    }

    #[test]
    fn test_delimit_equations_in_tree() {
        let mut tree = parse_html("<body><div>1) EQ01 + <b>EQ01</b></div></body>");
        let mut map = EquationMap::new();
        map.insert("EQ01", "x");
        let body = tree.body();
        delimit_equations(&mut tree, body, &map);
        assert_eq!(tree.text_content(body), "1) $EQ01$ + $EQ01$");
    }
}
