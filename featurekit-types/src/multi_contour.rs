use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::contour::Contour;

/// A set of contours, e.g. a multi-part polyline.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MultiContour<P>(pub Vec<Contour<P>>);

impl<P> MultiContour<P> {
    /// Iterate over the contours.
    pub fn contours(&self) -> impl Iterator<Item = &Contour<P>> {
        self.0.iter()
    }
}

impl<P: CartesianPoint2d> MultiContour<P> {
    /// Bounding rectangle of all contours.
    pub fn bounding_rectangle(&self) -> Option<Rect<P::Num>> {
        Rect::merge_all(self.0.iter().filter_map(Contour::bounding_rectangle))
    }
}

impl<P> From<Vec<Contour<P>>> for MultiContour<P> {
    fn from(value: Vec<Contour<P>>) -> Self {
        Self(value)
    }
}
