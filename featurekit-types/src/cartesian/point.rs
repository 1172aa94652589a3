use nalgebra::{Point2, Scalar, Vector2};
use num_traits::Float;

/// 2d point with `f64` coordinates. This is the point type produced by the WKB decoder.
pub type Point2d = Point2<f64>;

/// Point in 2d cartesian coordinate space.
pub trait CartesianPoint2d {
    /// Numeric type of the coordinates.
    type Num: Float + Scalar;

    /// X coordinate.
    fn x(&self) -> Self::Num;
    /// Y coordinate.
    fn y(&self) -> Self::Num;

    /// Returns true if both coordinates of the points are exactly equal.
    fn equal(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> bool {
        self.x() == other.x() && self.y() == other.y()
    }

    /// Vector from `other` to `self`.
    fn sub(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> Vector2<Self::Num> {
        Vector2::new(self.x() - other.x(), self.y() - other.y())
    }

    /// Squared euclidean distance between two points.
    fn distance_sq(&self, other: &impl CartesianPoint2d<Num = Self::Num>) -> Self::Num {
        let v = self.sub(other);
        v.x * v.x + v.y * v.y
    }
}

/// Point type that can be constructed from its coordinates.
pub trait NewCartesianPoint2d: CartesianPoint2d {
    /// Creates a new point.
    fn new(x: Self::Num, y: Self::Num) -> Self;
}

impl<N: Float + Scalar> CartesianPoint2d for Point2<N> {
    type Num = N;

    fn x(&self) -> N {
        self.x
    }

    fn y(&self) -> N {
        self.y
    }
}

impl<N: Float + Scalar> NewCartesianPoint2d for Point2<N> {
    fn new(x: N, y: N) -> Self {
        Point2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance() {
        let a = Point2d::new(1.0, 1.0);
        let b = Point2d::new(4.0, 5.0);
        assert_eq!(a.distance_sq(&b), 25.0);
        assert!(a.equal(&Point2d::new(1.0, 1.0)));
        assert!(!a.equal(&b));
    }
}
