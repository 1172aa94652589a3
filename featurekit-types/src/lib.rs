//! Geometry primitives shared by the `featurekit` crates.
//!
//! The crate contains a small set of concrete geometry types ([`Contour`], [`ClosedContour`], [`Polygon`] and their
//! multi-variants, unified by the [`Geom`] enum), generic over any [`CartesianPoint2d`] point type, plus the
//! algorithms the shapefile codec relies on: signed area and [`Winding`] of rings, point-in-ring tests and the
//! [`wkb`] codec.
//!
//! ```
//! use featurekit_types::cartesian::Point2d;
//! use featurekit_types::{ClosedContour, Winding};
//!
//! let ring = ClosedContour::new(vec![
//!     Point2d::new(0.0, 0.0),
//!     Point2d::new(10.0, 0.0),
//!     Point2d::new(10.0, 10.0),
//!     Point2d::new(0.0, 10.0),
//! ]);
//!
//! assert_eq!(ring.winding(), Winding::CounterClockwise);
//! assert_eq!(ring.with_winding(Winding::Clockwise).area_signed(), -100.0);
//! ```

pub mod cartesian;
pub mod contour;
pub mod error;
pub mod geometry;
pub mod multi_contour;
pub mod multi_point;
pub mod multi_polygon;
pub mod polygon;
pub mod segment;
pub mod wkb;

pub use contour::{ClosedContour, Contour, Winding};
pub use error::TypesError;
pub use geometry::Geom;
pub use multi_contour::MultiContour;
pub use multi_point::MultiPoint;
pub use multi_polygon::MultiPolygon;
pub use polygon::Polygon;
pub use segment::Segment;
