use crate::cartesian::CartesianPoint2d;

/// A strait line segment between two points.
#[derive(Debug, PartialEq)]
pub struct Segment<'a, Point>(pub &'a Point, pub &'a Point);

impl<P: CartesianPoint2d> Segment<'_, P> {
    /// Returns true if a horizontal ray cast from `point` towards positive X crosses the segment.
    ///
    /// Segment ends are treated half-open in Y, so a ray passing exactly through a shared vertex of two consecutive
    /// segments is counted once.
    pub fn crosses_ray<Point: CartesianPoint2d<Num = P::Num>>(&self, point: &Point) -> bool {
        let (a, b) = (self.0, self.1);
        if (a.y() > point.y()) == (b.y() > point.y()) {
            return false;
        }

        let x_cross = (b.x() - a.x()) * (point.y() - a.y()) / (b.y() - a.y()) + a.x();
        point.x() < x_cross
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    #[test]
    fn crosses_ray() {
        let a = Point2d::new(1.0, -1.0);
        let b = Point2d::new(1.0, 1.0);
        let segment = Segment(&a, &b);
        assert!(segment.crosses_ray(&Point2d::new(0.0, 0.0)));
        assert!(!segment.crosses_ray(&Point2d::new(2.0, 0.0)));
        assert!(!segment.crosses_ray(&Point2d::new(0.0, 2.0)));
    }
}
