//! Layout reconstruction: class runs, problem geometry, page segmentation
//! and endnote regions.

mod coords;
mod endnote;
mod runs;
mod segment;

pub use coords::{problem_markers, CoordinateAccumulator};
pub use endnote::{
    estimate_text_width, is_numbered_item, split_numbered_items, text_lines, EndnoteLocator,
    CHAR_WIDTH, SPACE_WIDTH, SYMBOL_WIDTH,
};
pub use runs::{class_sequence, stop_markers, ClassLabel, ClassRunDetector};
pub use segment::{page_containers, trim_stop_runs, PageSegmenter, ProblemFragment};
