//! Page geometry types.
//!
//! All absolute measurements are millimetres as written by the document
//! converter. Ratios are normalized against the enclosing page.

use serde::{Deserialize, Serialize};

/// Positional style of one element, resolved to millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleBox {
    /// Offset from the parent's left edge
    pub left: f64,
    /// Offset from the parent's top edge
    pub top: f64,
    /// Box width
    pub width: f64,
    /// Box height
    pub height: f64,
}

impl StyleBox {
    /// Create a style box.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge relative to the parent.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Whether every component is zero.
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// Absolute size of a page container in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageDimensions {
    /// Page width
    pub width: f64,
    /// Page height
    pub height: f64,
}

impl PageDimensions {
    /// Create page dimensions.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A4 portrait (210 x 297 mm).
    pub fn a4() -> Self {
        Self::new(210.0, 297.0)
    }

    /// Horizontal ratio of `mm`, or 0 when the width is unknown.
    pub fn x_ratio(&self, mm: f64) -> f64 {
        if self.width == 0.0 {
            0.0
        } else {
            mm / self.width
        }
    }

    /// Vertical ratio of `mm`, or 0 when the height is unknown.
    pub fn y_ratio(&self, mm: f64) -> f64 {
        if self.height == 0.0 {
            0.0
        } else {
            mm / self.height
        }
    }

    /// Whether either dimension is zero.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }
}

/// Region of a page as fractions of the page size.
///
/// Serialized as a `[left, top, right, bottom]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    /// Left edge ratio
    pub left: f64,
    /// Top edge ratio
    pub top: f64,
    /// Right edge ratio
    pub right: f64,
    /// Bottom edge ratio
    pub bottom: f64,
}

impl BoundingBox {
    /// Create a bounding box from ratios.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Build from millimetre edges, normalized against `page`.
    ///
    /// Each ratio is clamped to `[0, 1]`. With a degenerate page every
    /// component is 0.
    pub fn from_mm(page: PageDimensions, left: f64, top: f64, right: f64, bottom: f64) -> Self {
        if page.is_degenerate() {
            return Self::default();
        }
        Self::new(
            page.x_ratio(left),
            page.y_ratio(top),
            page.x_ratio(right),
            page.y_ratio(bottom),
        )
        .clamped()
    }

    /// Copy with every component clamped to `[0, 1]`.
    pub fn clamped(&self) -> Self {
        let c = |v: f64| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) };
        Self::new(c(self.left), c(self.top), c(self.right), c(self.bottom))
    }

    /// Vertical extent (`bottom - top`); negative when the box is inverted.
    pub fn height_ratio(&self) -> f64 {
        self.bottom - self.top
    }

    /// True when the top edge lies more than `tolerance` below the bottom edge.
    ///
    /// Such boxes cannot be cropped from a page image.
    pub fn is_inverted(&self, tolerance: f64) -> bool {
        self.top - self.bottom > tolerance
    }

    /// Pixel rectangle `(x1, y1, x2, y2)` for an image of the given size.
    pub fn to_pixels(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        let px = |ratio: f64, size: u32| (ratio.max(0.0) * f64::from(size)) as u32;
        (
            px(self.left, width),
            px(self.top, height),
            px(self.right, width),
            px(self.bottom, height),
        )
    }

    /// Components as an array.
    pub fn to_array(&self) -> [f64; 4] {
        [self.left, self.top, self.right, self.bottom]
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        b.to_array()
    }
}
