//! Scalar grids and isolines.
//!
//! A [`GridDefinition`] describes the extent and resolution of a grid and holds the sample points. A
//! [`GridInterpolationModel`] computes a value for every cell, [`generate_grid`] evaluates the model over the whole
//! grid in parallel, and [`IsolineTracer`] extracts lines of equal value from the result.
//!
//! ```
//! use featurekit_grid::{generate_grid, GridDefinition, IdwModel, IsolineTracer};
//! use featurekit_types::cartesian::{Point2d, Rect};
//!
//! let definition = GridDefinition::new(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0, -9999.0)?
//!     .with_data_points([(Point2d::new(5.0, 5.0), 10.0), (Point2d::new(0.0, 0.0), 0.0)]);
//!
//! let grid = generate_grid(&definition, &IdwModel::default())?;
//! let isolines = IsolineTracer::new(&grid).trace_levels(&[2.0, 4.0, 6.0])?;
//! assert_eq!(isolines.len(), 3);
//! # Ok::<(), featurekit_grid::error::GridError>(())
//! ```

pub use cell::GridCell;
pub use definition::GridDefinition;
pub use generate::{generate_grid, write_grid};
pub use interpolation::{GridInterpolationModel, IdwModel};
pub use isoline::{Isoline, IsolineTracer};
pub use matrix::GridMatrix;

mod cell;
mod definition;
pub mod error;
mod generate;
mod interpolation;
mod isoline;
mod matrix;
