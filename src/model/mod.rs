//! Document model types.
//!
//! This module defines the markup tree the layout passes operate on, the
//! geometry types they compute, and the per-document extraction results.

mod dom;
mod extraction;
mod geometry;

pub use dom::{Ancestors, Descendants, ElementData, HtmlTree, NodeData, NodeId};
pub use extraction::{
    ClassRun, DocumentInfo, ExtractedEndnotes, ExtractedPages, PageSummary, StopMarkerClass,
};
pub use geometry::{BoundingBox, PageDimensions, StyleBox};
