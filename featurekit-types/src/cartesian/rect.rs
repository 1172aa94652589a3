use nalgebra::{Point2, Scalar};
use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::cartesian::CartesianPoint2d;

/// Axis aligned rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect<N = f64> {
    /// Minimum X.
    pub x_min: N,
    /// Minimum Y.
    pub y_min: N,
    /// Maximum X.
    pub x_max: N,
    /// Maximum Y.
    pub y_max: N,
}

impl<N: Float + Scalar> Rect<N> {
    /// Creates a new rectangle.
    pub fn new(x_min: N, y_min: N, x_max: N, y_max: N) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Minimum X.
    pub fn x_min(&self) -> N {
        self.x_min
    }

    /// Maximum X.
    pub fn x_max(&self) -> N {
        self.x_max
    }

    /// Minimum Y.
    pub fn y_min(&self) -> N {
        self.y_min
    }

    /// Maximum Y.
    pub fn y_max(&self) -> N {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> N {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> N {
        self.y_max - self.y_min
    }

    /// Center point.
    pub fn center(&self) -> Point2<N> {
        let two = N::one() + N::one();
        Point2::new(
            (self.x_min + self.x_max) / two,
            (self.y_min + self.y_max) / two,
        )
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Merges all the rectangles of the iterator. Returns `None` for an empty iterator.
    pub fn merge_all(iter: impl IntoIterator<Item = Self>) -> Option<Self> {
        iter.into_iter().reduce(|acc, rect| acc.merge(rect))
    }

    /// Degenerate rectangle containing one point.
    pub fn from_point(p: &impl CartesianPoint2d<Num = N>) -> Self {
        Self {
            x_min: p.x(),
            x_max: p.x(),
            y_min: p.y(),
            y_max: p.y(),
        }
    }

    /// Bounding rectangle of the points. Returns `None` if the iterator is empty.
    pub fn from_points<'a, P: CartesianPoint2d<Num = N> + 'a>(
        mut points: impl Iterator<Item = &'a P>,
    ) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self::from_point(first);

        for p in points {
            rect.x_min = rect.x_min.min(p.x());
            rect.y_min = rect.y_min.min(p.y());
            rect.x_max = rect.x_max.max(p.x());
            rect.y_max = rect.y_max.max(p.y());
        }

        Some(rect)
    }

    /// Returns true if the point lies inside the rectangle or on its border.
    pub fn contains(&self, point: &impl CartesianPoint2d<Num = N>) -> bool {
        self.x_min <= point.x()
            && self.x_max >= point.x()
            && self.y_min <= point.y()
            && self.y_max >= point.y()
    }

    /// Returns true if `other` lies completely inside `self` (borders may touch).
    pub fn contains_rect(&self, other: &Self) -> bool {
        self.x_min <= other.x_min
            && self.x_max >= other.x_max
            && self.y_min <= other.y_min
            && self.y_max >= other.y_max
    }

    /// Returns true if the rectangle has positive width and height.
    pub fn is_proper(&self) -> bool {
        self.width() > N::zero() && self.height() > N::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartesian::Point2d;

    #[test]
    fn merge_is_order_independent() {
        let a = Rect::new(0.0, 0.0, 1.0, 1.0);
        let b = Rect::new(-1.0, 0.5, 0.5, 3.0);
        let c = Rect::new(2.0, -2.0, 2.5, -1.0);

        let abc = a.merge(b).merge(c);
        assert_eq!(abc, c.merge(a).merge(b));
        assert_eq!(abc, Rect::new(-1.0, -2.0, 2.5, 3.0));
        assert_eq!(Rect::merge_all([a, b, c]), Some(abc));
        assert_eq!(Rect::<f64>::merge_all([]), None);
    }

    #[test]
    fn from_points() {
        let points = [
            Point2d::new(1.0, 5.0),
            Point2d::new(-2.0, 3.0),
            Point2d::new(4.0, -1.0),
        ];
        let rect = Rect::from_points(points.iter()).unwrap();
        assert_eq!(rect, Rect::new(-2.0, -1.0, 4.0, 5.0));
        assert!(rect.contains(&Point2d::new(4.0, 5.0)));
        assert!(!rect.contains(&Point2d::new(4.1, 5.0)));
    }

    #[test]
    fn contains_rect() {
        let outer = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(outer.contains_rect(&Rect::new(2.0, 2.0, 8.0, 8.0)));
        assert!(outer.contains_rect(&outer));
        assert!(!outer.contains_rect(&Rect::new(2.0, 2.0, 11.0, 8.0)));
    }
}
