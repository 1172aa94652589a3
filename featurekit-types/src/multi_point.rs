use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};

/// A set of points.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MultiPoint<P>(pub Vec<P>);

impl<P> MultiPoint<P> {
    /// Iterate over the points.
    pub fn iter_points(&self) -> impl Iterator<Item = &P> {
        self.0.iter()
    }
}

impl<P: CartesianPoint2d> MultiPoint<P> {
    /// Bounding rectangle of all points.
    pub fn bounding_rectangle(&self) -> Option<Rect<P::Num>> {
        Rect::from_points(self.0.iter())
    }
}

impl<P> From<Vec<P>> for MultiPoint<P> {
    fn from(value: Vec<P>) -> Self {
        Self(value)
    }
}
