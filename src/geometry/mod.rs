//! Geometric primitives for node consolidation.
//!
//! Bounding boxes are page-relative rectangles in a top-left-origin coordinate
//! system measured in points: `y` grows downward, so `y0` is the top edge and
//! `y1` the bottom edge.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A page-relative rectangle locating an element or node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Page number the box lives on
    pub page: u32,
    /// Width of the page in points
    pub page_width: f32,
    /// Height of the page in points
    pub page_height: f32,
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a validated bounding box.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidBoundingBox`] when `x0 > x1`, `y0 > y1`, a
    /// coordinate is not finite, or a page dimension is not positive.
    ///
    /// # Examples
    ///
    /// ```
    /// use doc_consolidate::geometry::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(1, 612.0, 792.0, 10.0, 20.0, 110.0, 70.0).unwrap();
    /// assert_eq!(bbox.width(), 100.0);
    /// assert!(BoundingBox::new(1, 612.0, 792.0, 110.0, 20.0, 10.0, 70.0).is_err());
    /// ```
    pub fn new(
        page: u32,
        page_width: f32,
        page_height: f32,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
    ) -> Result<Self> {
        let bbox = Self {
            page,
            page_width,
            page_height,
            x0,
            y0,
            x1,
            y1,
        };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check the box invariants.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidBoundingBox {
            page: self.page,
            reason,
        };

        let coords = [self.x0, self.y0, self.x1, self.y1];
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(invalid(format!("non-finite coordinate in {:?}", coords)));
        }
        if !(self.page_width.is_finite() && self.page_width > 0.0)
            || !(self.page_height.is_finite() && self.page_height > 0.0)
        {
            return Err(invalid(format!(
                "page dimensions must be positive, got {}x{}",
                self.page_width, self.page_height
            )));
        }
        if self.x0 > self.x1 {
            return Err(invalid(format!("x0 ({}) > x1 ({})", self.x0, self.x1)));
        }
        if self.y0 > self.y1 {
            return Err(invalid(format!("y0 ({}) > y1 ({})", self.y0, self.y1)));
        }
        Ok(())
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Area of the page the box sits on.
    pub fn page_area(&self) -> f32 {
        self.page_width * self.page_height
    }

    /// Fraction of the page covered by this box, in `[0, 1]` for boxes inside the page.
    pub fn page_coverage(&self) -> f32 {
        self.area() / self.page_area()
    }

    /// Union of two boxes.
    ///
    /// Same-page boxes combine corner-wise. Boxes on different pages produce a
    /// box spanning both extents, anchored to the lower page number.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            page: self.page.min(other.page),
            page_width: self.page_width.max(other.page_width),
            page_height: self.page_height.max(other.page_height),
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether `other` lies fully inside this box on the same page.
    ///
    /// Edges are inclusive.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.page == other.page
            && other.x0 >= self.x0
            && other.x1 <= self.x1
            && other.y0 >= self.y0
            && other.y1 <= self.y1
    }

    /// Horizontal distance between the boxes, `0` when their x-ranges overlap.
    pub fn horizontal_gap(&self, other: &BoundingBox) -> f32 {
        (self.x0.max(other.x0) - self.x1.min(other.x1)).max(0.0)
    }

    /// Vertical distance between the boxes, `0` when their y-ranges overlap.
    pub fn vertical_gap(&self, other: &BoundingBox) -> f32 {
        (self.y0.max(other.y0) - self.y1.min(other.y1)).max(0.0)
    }

    /// Whether the x-ranges overlap or touch within `epsilon`.
    pub fn overlaps_horizontally(&self, other: &BoundingBox, epsilon: f32) -> bool {
        self.horizontal_gap(other) <= epsilon
    }

    /// Whether the y-ranges overlap or touch within `epsilon`.
    pub fn overlaps_vertically(&self, other: &BoundingBox, epsilon: f32) -> bool {
        self.vertical_gap(other) <= epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(page: u32, x0: f32, y0: f32, x1: f32, y1: f32) -> BoundingBox {
        BoundingBox::new(page, 600.0, 800.0, x0, y0, x1, y1).unwrap()
    }

    #[test]
    fn test_bbox_creation() {
        let b = bbox(1, 10.0, 20.0, 110.0, 70.0);
        assert_eq!(b.width(), 100.0);
        assert_eq!(b.height(), 50.0);
        assert_eq!(b.area(), 5000.0);
        assert_eq!(b.page_area(), 480_000.0);
    }

    #[test]
    fn test_bbox_rejects_inverted_coordinates() {
        assert!(BoundingBox::new(1, 600.0, 800.0, 50.0, 0.0, 10.0, 10.0).is_err());
        assert!(BoundingBox::new(1, 600.0, 800.0, 0.0, 50.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn test_bbox_rejects_bad_page_dimensions() {
        assert!(BoundingBox::new(1, 0.0, 800.0, 0.0, 0.0, 10.0, 10.0).is_err());
        assert!(BoundingBox::new(1, 600.0, -1.0, 0.0, 0.0, 10.0, 10.0).is_err());
        assert!(BoundingBox::new(1, 600.0, 800.0, f32::NAN, 0.0, 10.0, 10.0).is_err());
    }

    #[test]
    fn test_degenerate_box_is_valid() {
        let b = bbox(1, 5.0, 5.0, 5.0, 5.0);
        assert_eq!(b.area(), 0.0);
    }

    #[test]
    fn test_union_same_page() {
        let u = bbox(1, 0.0, 0.0, 50.0, 50.0).union(&bbox(1, 25.0, 25.0, 75.0, 75.0));
        assert_eq!(u.page, 1);
        assert_eq!((u.x0, u.y0, u.x1, u.y1), (0.0, 0.0, 75.0, 75.0));
    }

    #[test]
    fn test_union_across_pages_takes_lower_page() {
        let u = bbox(3, 10.0, 700.0, 200.0, 780.0).union(&bbox(2, 20.0, 10.0, 220.0, 40.0));
        assert_eq!(u.page, 2);
        assert_eq!((u.x0, u.y0, u.x1, u.y1), (10.0, 10.0, 220.0, 780.0));
    }

    #[test]
    fn test_contains() {
        let outer = bbox(1, 0.0, 0.0, 100.0, 100.0);
        assert!(outer.contains(&bbox(1, 10.0, 10.0, 90.0, 90.0)));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&bbox(1, 10.0, 10.0, 110.0, 90.0)));
        assert!(!outer.contains(&bbox(2, 10.0, 10.0, 90.0, 90.0)));
    }

    #[test]
    fn test_gaps() {
        let a = bbox(1, 0.0, 0.0, 100.0, 20.0);
        let right = bbox(1, 105.0, 0.0, 200.0, 20.0);
        let below = bbox(1, 0.0, 28.0, 100.0, 40.0);

        assert_eq!(a.horizontal_gap(&right), 5.0);
        assert_eq!(a.vertical_gap(&right), 0.0);
        assert_eq!(a.vertical_gap(&below), 8.0);
        assert_eq!(a.horizontal_gap(&below), 0.0);
        assert_eq!(right.horizontal_gap(&a), 5.0);
    }

    #[test]
    fn test_touching_within_epsilon() {
        let a = bbox(1, 0.0, 0.0, 100.0, 50.0);
        let b = bbox(1, 0.0, 50.5, 100.0, 100.0);
        assert!(a.overlaps_vertically(&b, 1.0));
        assert!(!a.overlaps_vertically(&b, 0.1));
        assert!(a.overlaps_horizontally(&b, 0.0));
    }
}
