//! Bounding box type in the `[ymin, ymax, xmin, xmax]` convention.
//!
//! The annotation files store every box as a 4-element integer array in
//! this order, so the type serializes to and from exactly that shape.
//!
//! Note: the constructor does NOT enforce that min < max on either axis.
//! Malformed boxes are allowed to exist so that quality passes can find
//! and report them; [`BBox::is_well_formed`] is the check.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned bounding box with integer pixel coordinates.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 4]", into = "[u32; 4]")]
pub struct BBox {
    pub ymin: u32,
    pub ymax: u32,
    pub xmin: u32,
    pub xmax: u32,
}

impl BBox {
    /// Creates a new bounding box from explicit coordinates.
    #[inline]
    pub fn new(ymin: u32, ymax: u32, xmin: u32, xmax: u32) -> Self {
        Self {
            ymin,
            ymax,
            xmin,
            xmax,
        }
    }

    /// Returns the width of the box. Negative if the box is malformed.
    #[inline]
    pub fn width(&self) -> i64 {
        self.xmax as i64 - self.xmin as i64
    }

    /// Returns the height of the box. Negative if the box is malformed.
    #[inline]
    pub fn height(&self) -> i64 {
        self.ymax as i64 - self.ymin as i64
    }

    /// Returns the area of the box. May be negative or zero if malformed.
    ///
    /// Widened to `i128`: coordinates span the full `u32` range, and the
    /// product of two `u32`-sized extents overflows `i64`.
    #[inline]
    pub fn area(&self) -> i128 {
        self.width() as i128 * self.height() as i128
    }

    /// Returns true if the box is non-degenerate: `ymin < ymax` and
    /// `xmin < xmax`.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.ymin < self.ymax && self.xmin < self.xmax
    }

    /// Returns the intersection area of two boxes, zero if disjoint.
    fn intersection_area(&self, other: &BBox) -> i128 {
        let x1 = self.xmin.max(other.xmin) as i128;
        let y1 = self.ymin.max(other.ymin) as i128;
        let x2 = self.xmax.min(other.xmax) as i128;
        let y2 = self.ymax.min(other.ymax) as i128;
        (x2 - x1).max(0) * (y2 - y1).max(0)
    }

    /// Intersection over Union of two boxes.
    ///
    /// Returns 0.0 when the union area is not positive, which can only
    /// happen for degenerate boxes.
    pub fn iou(&self, other: &BBox) -> f64 {
        let intersection = self.intersection_area(other);
        let union = (self.area() + other.area() - intersection) as f64;
        if union <= 0.0 {
            return 0.0;
        }
        intersection as f64 / union
    }

    /// The fraction of `other`'s area that lies inside `self`.
    ///
    /// Returns 0.0 when `other` has no positive area.
    pub fn inclusion_ratio(&self, other: &BBox) -> f64 {
        let other_area = other.area();
        if other_area <= 0 {
            return 0.0;
        }
        self.intersection_area(other) as f64 / other_area as f64
    }
}

impl From<[u32; 4]> for BBox {
    fn from(v: [u32; 4]) -> Self {
        BBox::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [u32; 4] {
    fn from(b: BBox) -> Self {
        [b.ymin, b.ymax, b.xmin, b.xmax]
    }
}

impl fmt::Debug for BBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.ymin, self.ymax, self.xmin, self.xmax
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_requires_strict_ordering_on_both_axes() {
        assert!(BBox::new(10, 20, 30, 40).is_well_formed());
        assert!(!BBox::new(20, 10, 30, 40).is_well_formed());
        assert!(!BBox::new(10, 20, 40, 30).is_well_formed());
        // zero-height box is degenerate
        assert!(!BBox::new(10, 10, 30, 40).is_well_formed());
    }

    #[test]
    fn iou_of_identical_boxes_is_one() {
        let b = BBox::new(0, 100, 0, 100);
        assert!((b.iou(&b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = BBox::new(0, 10, 0, 10);
        let b = BBox::new(20, 30, 20, 30);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn iou_of_half_overlap() {
        // two 10x10 boxes sharing a 5x10 strip: 50 / (100 + 100 - 50)
        let a = BBox::new(0, 10, 0, 10);
        let b = BBox::new(0, 10, 5, 15);
        assert!((a.iou(&b) - 50.0 / 150.0).abs() < 1e-9);
    }

    #[test]
    fn inclusion_ratio_of_contained_box_is_one() {
        let outer = BBox::new(0, 100, 0, 100);
        let inner = BBox::new(25, 75, 25, 75);
        assert!((outer.inclusion_ratio(&inner) - 1.0).abs() < 1e-9);
        // the outer box is only partially inside the inner one
        assert!(inner.inclusion_ratio(&outer) < 1.0);
    }

    #[test]
    fn area_and_iou_survive_maximal_coordinates() {
        let huge = BBox::new(0, u32::MAX, 0, u32::MAX);
        assert_eq!(huge.area(), (u32::MAX as i128) * (u32::MAX as i128));
        assert!((huge.iou(&huge) - 1.0).abs() < 1e-9);
        assert!((huge.inclusion_ratio(&huge) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_as_four_element_array() {
        let b = BBox::new(1, 2, 3, 4);
        let json = serde_json::to_string(&b).unwrap();
        assert_eq!(json, "[1,2,3,4]");
        let back: BBox = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b);
    }
}
