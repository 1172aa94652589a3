//! Polygon: an outer ring and zero or more holes.

use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::contour::{ClosedContour, Winding};

/// Polygon geometry. Contains one outer contour and zero or more inner contours (holes).
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Polygon<P> {
    /// Outer contour.
    pub outer_contour: ClosedContour<P>,
    /// Inner contours (holes).
    pub inner_contours: Vec<ClosedContour<P>>,
}

impl<P> Polygon<P> {
    /// Creates a new polygon.
    pub fn new(outer_contour: ClosedContour<P>, inner_contours: Vec<ClosedContour<P>>) -> Self {
        Self {
            outer_contour,
            inner_contours,
        }
    }

    /// Iterates over all contours of the polygon, starting with the outer one.
    pub fn iter_contours(&self) -> impl Iterator<Item = &ClosedContour<P>> {
        std::iter::once(&self.outer_contour).chain(self.inner_contours.iter())
    }
}

impl<P: CartesianPoint2d> Polygon<P> {
    /// Returns true if the point is inside the outer contour and not inside any of the holes.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = P::Num>) -> bool {
        self.outer_contour.contains_point(point)
            && !self
                .inner_contours
                .iter()
                .any(|hole| hole.contains_point(point))
    }

    /// Bounding rectangle of the outer contour.
    pub fn bounding_rectangle(&self) -> Option<Rect<P::Num>> {
        self.outer_contour.bounding_rectangle()
    }

    /// Reorients the rings so that the outer contour goes in the `outer` direction and all holes in the opposite
    /// one.
    pub fn oriented(self, outer: Winding) -> Self {
        Self {
            outer_contour: self.outer_contour.with_winding(outer),
            inner_contours: self
                .inner_contours
                .into_iter()
                .map(|c| c.with_winding(outer.reversed()))
                .collect(),
        }
    }
}

impl<P> From<ClosedContour<P>> for Polygon<P> {
    fn from(value: ClosedContour<P>) -> Self {
        Self {
            outer_contour: value,
            inner_contours: vec![],
        }
    }
}
