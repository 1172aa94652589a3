use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::polygon::Polygon;

/// A set of polygons.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MultiPolygon<P>(pub Vec<Polygon<P>>);

impl<P> MultiPolygon<P> {
    /// Iterate over the polygons.
    pub fn polygons(&self) -> impl Iterator<Item = &Polygon<P>> {
        self.0.iter()
    }
}

impl<P: CartesianPoint2d> MultiPolygon<P> {
    /// Bounding rectangle of all polygons.
    pub fn bounding_rectangle(&self) -> Option<Rect<P::Num>> {
        Rect::merge_all(self.0.iter().filter_map(Polygon::bounding_rectangle))
    }

    /// Returns true if any of the polygons contains the point.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = P::Num>) -> bool {
        self.0.iter().any(|p| p.contains_point(point))
    }
}

impl<P> From<Vec<Polygon<P>>> for MultiPolygon<P> {
    fn from(value: Vec<Polygon<P>>) -> Self {
        Self(value)
    }
}
