//! Contour is a sequence of points.
//!
//! Contours can be:
//! * **open** - meaning that the first and the last points of the contour are not connected. For example, a road on
//!   the map can be represented as an open contour.
//! * **closed** - when the first and the last points of the contour are connected. For example, a shoreline or a
//!   polygon ring can be represented as a closed contour.
//!
//! # Contour vs OGC LineString
//!
//! In the OGC Simple Feature Access standard (and so in WKB and shapefiles), a `LineString` is considered to be
//! closed when the first and the last points in the sequence are exactly same. `Contour` does not have that
//! requirement. Even more, a [`ClosedContour`] should not duplicate the first point at the end. The closing segment is
//! handled by [`ClosedContour::iter_points_closing`] and [`ClosedContour::iter_segments`] instead. Use
//! [`ClosedContour::from_ring`] to convert an OGC ring into a closed contour.

use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianPoint2d, Rect};
use crate::segment::Segment;

/// Direction in which the points of a closed contour go around its interior.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Winding {
    /// Clockwise. Degenerate contours with zero area are considered clockwise.
    Clockwise,
    /// Counterclockwise.
    CounterClockwise,
}

impl Winding {
    /// The other direction.
    pub fn reversed(self) -> Self {
        match self {
            Winding::Clockwise => Winding::CounterClockwise,
            Winding::CounterClockwise => Winding::Clockwise,
        }
    }
}

/// Open or closed sequence of points. See module level documentation for details.
#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
pub struct Contour<Point> {
    /// Points of the contour.
    pub points: Vec<Point>,
    is_closed: bool,
}

impl<Point> Contour<Point> {
    /// Creates a new open contour.
    pub fn open(points: Vec<Point>) -> Self {
        Self {
            points,
            is_closed: false,
        }
    }

    /// Creates a new closed contour.
    pub fn closed(points: Vec<Point>) -> Self {
        Self {
            points,
            is_closed: true,
        }
    }

    /// Whether the contour is closed.
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Iterate over the points of the contour.
    pub fn iter_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Same as [`Contour::iter_points`] but for closed contours repeats the first point again at the end of the
    /// iterator.
    pub fn iter_points_closing(&self) -> impl Iterator<Item = &Point> {
        ContourPointsIterator::new(self.points.iter(), self.is_closed)
    }

    /// Iterates over segments of the contour. For closed contours this includes the segment between the last and the
    /// first points of the contour.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, Point>> {
        ContourSegmentIterator::new(ContourPointsIterator::new(
            self.points.iter(),
            self.is_closed,
        ))
    }
}

impl<P: CartesianPoint2d> Contour<P> {
    /// Bounding rectangle of the contour, `None` if the contour has no points.
    pub fn bounding_rectangle(&self) -> Option<Rect<P::Num>> {
        Rect::from_points(self.points.iter())
    }
}

impl<P> From<ClosedContour<P>> for Contour<P> {
    fn from(value: ClosedContour<P>) -> Self {
        Self {
            points: value.points,
            is_closed: true,
        }
    }
}

/// Closed contour, e.g. a polygon ring.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClosedContour<Point> {
    /// Points of the contour. The first point is not repeated at the end.
    pub points: Vec<Point>,
}

impl<Point> ClosedContour<Point> {
    /// Creates a new closed contour.
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    /// Iterate over the points of the contour.
    pub fn iter_points(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Same as [`ClosedContour::iter_points`] but repeats the first point again at the end of the iterator.
    pub fn iter_points_closing(&self) -> impl Iterator<Item = &Point> {
        ContourPointsIterator::new(self.points.iter(), true)
    }

    /// Iterates over segments of the contour, including the segment between the last and the first points.
    pub fn iter_segments(&self) -> impl Iterator<Item = Segment<'_, Point>> {
        ContourSegmentIterator::new(ContourPointsIterator::new(self.points.iter(), true))
    }

    /// Number of points in the contour, not counting the closing one.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the contour has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Reverses the direction of the contour.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }
}

impl<P: CartesianPoint2d> ClosedContour<P> {
    /// Creates a closed contour from an OGC style ring. If the last point of the ring repeats the first one, it is
    /// removed. If it does not, the ring is considered to be closed implicitly.
    pub fn from_ring(mut points: Vec<P>) -> Self {
        if points.len() > 1 {
            if let (Some(first), Some(last)) = (points.first(), points.last()) {
                if first.equal(last) {
                    points.pop();
                }
            }
        }

        Self { points }
    }

    /// Signed area of the contour (shoelace formula). Positive for counterclockwise contours.
    pub fn area_signed(&self) -> P::Num {
        let two = P::Num::one() + P::Num::one();
        let mut iter = self.iter_points_closing();
        let Some(mut prev) = iter.next() else {
            return P::Num::zero();
        };

        let mut aggr = P::Num::zero();
        for p in iter {
            aggr = aggr + prev.x() * p.y() - p.x() * prev.y();
            prev = p;
        }

        aggr / two
    }

    /// Winding of the contour.
    pub fn winding(&self) -> Winding {
        if self.area_signed() <= P::Num::zero() {
            Winding::Clockwise
        } else {
            Winding::CounterClockwise
        }
    }

    /// Returns the contour with the given winding, reversing the order of points if necessary.
    pub fn with_winding(mut self, winding: Winding) -> Self {
        if self.winding() != winding {
            self.reverse();
        }

        self
    }

    /// Ray casting (crossing number) test. Returns true if the point lies inside the contour.
    ///
    /// Points lying exactly on the contour may be reported either way.
    pub fn contains_point(&self, point: &impl CartesianPoint2d<Num = P::Num>) -> bool {
        self.iter_segments()
            .filter(|segment| segment.crosses_ray(point))
            .count()
            % 2
            == 1
    }

    /// Bounding rectangle of the contour, `None` if the contour has no points.
    pub fn bounding_rectangle(&self) -> Option<Rect<P::Num>> {
        Rect::from_points(self.points.iter())
    }
}

/// Iterator of contour points.
#[derive(Debug, Clone)]
pub struct ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    points_iter: Iter,
    is_closed: bool,
    first_point: Option<&'a P>,
}

impl<'a, P: 'a, Iter> ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    fn new(points_iter: Iter, is_closed: bool) -> Self {
        Self {
            points_iter,
            is_closed,
            first_point: None,
        }
    }
}

impl<'a, P, Iter> Iterator for ContourPointsIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    type Item = &'a P;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.points_iter.next();
        if self.is_closed && self.first_point.is_none() {
            self.first_point = next;
        }

        if next.is_none() {
            self.first_point.take()
        } else {
            next
        }
    }
}

/// Iterator of contour segements.
#[derive(Debug, Clone)]
pub struct ContourSegmentIterator<'a, P: 'a, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    points_iter: ContourPointsIterator<'a, P, Iter>,
    prev_point: Option<&'a P>,
}

impl<'a, P, Iter> ContourSegmentIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    fn new(points_iter: ContourPointsIterator<'a, P, Iter>) -> Self {
        Self {
            points_iter,
            prev_point: None,
        }
    }
}

impl<'a, P, Iter> Iterator for ContourSegmentIterator<'a, P, Iter>
where
    Iter: Iterator<Item = &'a P>,
{
    type Item = Segment<'a, P>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next_point = self.points_iter.next()?;
            if let Some(prev) = self.prev_point.replace(next_point) {
                return Some(Segment(prev, next_point));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::cartesian::Point2d;

    fn square() -> ClosedContour<Point2d> {
        ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 10.0),
            Point2d::new(0.0, 10.0),
        ])
    }

    #[test]
    fn iter_points_closing() {
        let contour = Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(contour.iter_points_closing().count(), 2);
        assert_eq!(
            *contour.iter_points_closing().last().unwrap(),
            Point2d::new(1.0, 1.0)
        );

        let contour = ClosedContour::new(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(contour.iter_points_closing().count(), 3);
        assert_eq!(
            *contour.iter_points_closing().last().unwrap(),
            Point2d::new(0.0, 0.0)
        );
    }

    #[test]
    fn iter_segments() {
        let contour = Contour::open(vec![Point2d::new(0.0, 0.0)]);
        assert_eq!(contour.iter_segments().count(), 0);

        let contour = ClosedContour::new(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 1.0)]);
        assert_eq!(contour.iter_segments().count(), 2);
        assert_eq!(
            contour.iter_segments().last().unwrap(),
            Segment(&Point2d::new(1.0, 1.0), &Point2d::new(0.0, 0.0))
        );
    }

    #[test]
    fn area() {
        let contour = ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(0.0, 1.0),
            Point2d::new(1.0, 0.0),
        ]);
        assert_eq!(contour.area_signed(), -0.5);
        assert_eq!(contour.winding(), Winding::Clockwise);

        let contour = ClosedContour::new(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(0.0, 1.0),
        ]);
        assert_eq!(contour.area_signed(), 0.5);
        assert_eq!(contour.winding(), Winding::CounterClockwise);
    }

    #[test]
    fn area_of_hexagon() {
        let hexagon = ClosedContour::new(
            (0..6)
                .map(|i| {
                    let angle = i as f64 * std::f64::consts::FRAC_PI_3;
                    Point2d::new(angle.cos(), angle.sin())
                })
                .collect(),
        );

        let expected = 3.0 * 3f64.sqrt() / 2.0;
        assert_relative_eq!(hexagon.area_signed(), expected, epsilon = 1e-12);

        let mut reversed = hexagon.clone();
        reversed.reverse();
        assert_relative_eq!(reversed.area_signed(), -expected, epsilon = 1e-12);
    }

    #[test]
    fn with_winding_reverses_only_when_needed() {
        let ccw = square();
        assert_eq!(ccw.winding(), Winding::CounterClockwise);
        let cw = ccw.clone().with_winding(Winding::Clockwise);
        assert_eq!(cw.winding(), Winding::Clockwise);
        assert_eq!(cw.points[0], Point2d::new(0.0, 10.0));
        assert_eq!(cw.clone().with_winding(Winding::Clockwise), cw);
    }

    #[test]
    fn from_ring_strips_closing_point() {
        let ring = ClosedContour::from_ring(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(1.0, 1.0),
            Point2d::new(0.0, 0.0),
        ]);
        assert_eq!(ring.len(), 3);

        let implicit = ClosedContour::from_ring(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(1.0, 0.0),
            Point2d::new(1.0, 1.0),
        ]);
        assert_eq!(implicit, ring);
    }

    #[test]
    fn contains_point() {
        let contour = square();
        assert!(contour.contains_point(&Point2d::new(5.0, 5.0)));
        assert!(contour.contains_point(&Point2d::new(0.5, 9.5)));
        assert!(!contour.contains_point(&Point2d::new(-0.5, 5.0)));
        assert!(!contour.contains_point(&Point2d::new(5.0, 10.5)));
        assert!(!contour.contains_point(&Point2d::new(15.0, 5.0)));
    }
}
