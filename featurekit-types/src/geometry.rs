//! Generic geometry sum type.

use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::contour::Contour;
use crate::multi_contour::MultiContour;
use crate::multi_point::MultiPoint;
use crate::multi_polygon::MultiPolygon;
use crate::polygon::Polygon;

/// Geometry of any of the supported kinds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Geom<P> {
    /// Point geometry.
    Point(P),
    /// MultiPoint geometry.
    MultiPoint(MultiPoint<P>),
    /// Contour geometry (LineString in OGC terms).
    Contour(Contour<P>),
    /// MultiContour geometry (MultiLineString in OGC terms).
    MultiContour(MultiContour<P>),
    /// Polygon geometry.
    Polygon(Polygon<P>),
    /// MultiPolygon geometry.
    MultiPolygon(MultiPolygon<P>),
}

impl<P: CartesianPoint2d> Geom<P> {
    /// Bounding rectangle of the geometry, `None` for empty geometries.
    pub fn bounding_rectangle(&self) -> Option<Rect<P::Num>> {
        match self {
            Geom::Point(p) => Some(Rect::from_point(p)),
            Geom::MultiPoint(v) => v.bounding_rectangle(),
            Geom::Contour(v) => v.bounding_rectangle(),
            Geom::MultiContour(v) => v.bounding_rectangle(),
            Geom::Polygon(v) => v.bounding_rectangle(),
            Geom::MultiPolygon(v) => v.bounding_rectangle(),
        }
    }
}

impl<P> Geom<P> {
    /// Human readable name of the geometry kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Geom::Point(_) => "Point",
            Geom::MultiPoint(_) => "MultiPoint",
            Geom::Contour(_) => "LineString",
            Geom::MultiContour(_) => "MultiLineString",
            Geom::Polygon(_) => "Polygon",
            Geom::MultiPolygon(_) => "MultiPolygon",
        }
    }
}

impl<P> From<Contour<P>> for Geom<P> {
    fn from(value: Contour<P>) -> Self {
        Self::Contour(value)
    }
}

impl<P> From<MultiPoint<P>> for Geom<P> {
    fn from(value: MultiPoint<P>) -> Self {
        Self::MultiPoint(value)
    }
}

impl<P> From<MultiContour<P>> for Geom<P> {
    fn from(value: MultiContour<P>) -> Self {
        Self::MultiContour(value)
    }
}

impl<P> From<Polygon<P>> for Geom<P> {
    fn from(value: Polygon<P>) -> Self {
        Self::Polygon(value)
    }
}

impl<P> From<MultiPolygon<P>> for Geom<P> {
    fn from(value: MultiPolygon<P>) -> Self {
        Self::MultiPolygon(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;
    use crate::contour::ClosedContour;

    #[test]
    fn bounding_rectangle() {
        let point = Geom::Point(Point2d::new(3.0, 4.0));
        assert_eq!(
            point.bounding_rectangle(),
            Some(Rect::new(3.0, 4.0, 3.0, 4.0))
        );

        let multi: Geom<Point2d> = MultiPolygon(vec![
            ClosedContour::new(vec![
                Point2d::new(0.0, 0.0),
                Point2d::new(1.0, 0.0),
                Point2d::new(1.0, 1.0),
            ])
            .into(),
            ClosedContour::new(vec![
                Point2d::new(5.0, -2.0),
                Point2d::new(6.0, 0.0),
                Point2d::new(5.0, 1.0),
            ])
            .into(),
        ])
        .into();
        assert_eq!(
            multi.bounding_rectangle(),
            Some(Rect::new(0.0, -2.0, 6.0, 1.0))
        );

        let empty: Geom<Point2d> = MultiPoint(vec![]).into();
        assert_eq!(empty.bounding_rectangle(), None);
    }
}
