//! Repeated class-run detection.
//!
//! Converted pages pad vertical space with long runs of identical, empty line
//! elements. Any class list repeated back-to-back at least `threshold` times
//! is treated as such a filler, which lets the boundaries be found without
//! knowing the document template.

use crate::model::{ClassRun, HtmlTree, NodeId, StopMarkerClass};

/// Class list of one element; `None` for elements without classes.
pub type ClassLabel = Option<Vec<String>>;

/// Finds class lists that repeat in unbroken runs.
#[derive(Debug, Clone, Copy)]
pub struct ClassRunDetector {
    threshold: usize,
}

impl ClassRunDetector {
    /// Create a detector reporting runs of at least `threshold` elements.
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold: threshold.max(1),
        }
    }

    /// The minimum run length.
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Report every maximal run of length >= threshold, in order.
    pub fn detect(&self, labels: &[ClassLabel]) -> Vec<ClassRun> {
        let mut runs = Vec::new();
        let Some(first) = labels.first() else {
            return runs;
        };

        let mut current = first;
        let mut count = 1;
        for label in &labels[1..] {
            if label == current {
                count += 1;
                continue;
            }
            if count >= self.threshold {
                runs.push(ClassRun::new(current.clone(), count));
            }
            current = label;
            count = 1;
        }
        if count >= self.threshold {
            runs.push(ClassRun::new(current.clone(), count));
        }

        runs
    }

    /// Detect runs over every element below `root`, in document order.
    pub fn detect_in(&self, tree: &HtmlTree, root: NodeId) -> Vec<ClassRun> {
        self.detect(&class_sequence(tree, root))
    }
}

impl Default for ClassRunDetector {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Class labels of all element descendants of `root`, in document order.
pub fn class_sequence(tree: &HtmlTree, root: NodeId) -> Vec<ClassLabel> {
    tree.element_descendants(root)
        .filter_map(|id| tree.element(id))
        .map(|el| (!el.classes.is_empty()).then(|| el.classes.clone()))
        .collect()
}

/// Distinct stop markers from detected runs, in first-seen order.
///
/// Runs of classless elements cannot be addressed by class and are skipped.
pub fn stop_markers(runs: &[ClassRun]) -> Vec<StopMarkerClass> {
    let mut markers: Vec<StopMarkerClass> = Vec::new();
    for run in runs {
        if let Some(classes) = &run.classes {
            let marker = StopMarkerClass::new(classes.clone());
            if !markers.contains(&marker) {
                markers.push(marker);
            }
        }
    }
    markers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    fn label(s: &str) -> ClassLabel {
        Some(vec![s.to_string()])
    }

    #[test]
    fn test_only_runs_above_threshold() {
        let mut labels = vec![label("A"); 5];
        labels.extend(vec![label("B"); 3]);
        let runs = ClassRunDetector::new(4).detect(&labels);
        assert_eq!(runs, vec![ClassRun::new(label("A"), 5)]);
    }

    #[test]
    fn test_null_label_run_is_reported() {
        let mut labels = vec![label("A")];
        labels.extend(vec![None; 4]);
        let runs = ClassRunDetector::new(4).detect(&labels);
        assert_eq!(runs, vec![ClassRun::new(None, 4)]);
        assert!(stop_markers(&runs).is_empty());
    }

    #[test]
    fn test_runs_are_maximal_and_repeatable() {
        let mut labels = vec![label("A"); 6];
        labels.push(label("B"));
        labels.extend(vec![label("A"); 4]);
        let runs = ClassRunDetector::new(4).detect(&labels);
        assert_eq!(
            runs,
            vec![ClassRun::new(label("A"), 6), ClassRun::new(label("A"), 4)]
        );
        assert_eq!(stop_markers(&runs).len(), 1);
    }

    #[test]
    fn test_empty_sequence() {
        assert!(ClassRunDetector::default().detect(&[]).is_empty());
    }

    #[test]
    fn test_detect_in_document() {
        let tree = parse_html(
            r#"<body><div class="hpa"><div class="hls ps4"></div><div class="hls ps4"></div><div class="hls ps4"></div><div class="hls ps4"></div><span></span></div></body>"#,
        );
        let runs = ClassRunDetector::default().detect_in(&tree, tree.body());
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].count, 4);
        let markers = stop_markers(&runs);
        assert_eq!(markers[0].key(), "hls ps4");
    }
}
