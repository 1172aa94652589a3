use ahash::AHashMap;
use featurekit_types::cartesian::{Point2d, Rect};

use crate::error::GridError;

/// Description of the grid to generate: its extent and resolution, and the sample points the cell values are
/// interpolated from.
///
/// The grid covers the extent starting from its top-left corner. If the extent is not a multiple of the cell size,
/// the last column and the last row extend beyond the right and the bottom edges of the extent.
#[derive(Debug, Clone)]
pub struct GridDefinition {
    extent: Rect,
    cell_size: f64,
    no_data_value: f64,
    data_points: AHashMap<PointKey, (Point2d, f64)>,
}

/// Hashable identity of a point.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PointKey(u64, u64);

impl PointKey {
    fn new(point: &Point2d) -> Self {
        // -0.0 and 0.0 are the same point
        Self((point.x + 0.0).to_bits(), (point.y + 0.0).to_bits())
    }
}

impl GridDefinition {
    /// Creates a definition without data points.
    pub fn new(extent: Rect, cell_size: f64, no_data_value: f64) -> Result<Self, GridError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidDefinition(format!(
                "cell size must be a positive number, got {cell_size}"
            )));
        }

        if !(extent.width() > 0.0 && extent.height() > 0.0) {
            return Err(GridError::InvalidDefinition(format!(
                "extent must have positive width and height, got {extent:?}"
            )));
        }

        Ok(Self {
            extent,
            cell_size,
            no_data_value,
            data_points: AHashMap::new(),
        })
    }

    /// Adds data points. A point at the same position as an existing one replaces its value.
    pub fn with_data_points(mut self, points: impl IntoIterator<Item = (Point2d, f64)>) -> Self {
        for (point, value) in points {
            self.add_data_point(point, value);
        }

        self
    }

    /// Adds a data point. Returns the previous value at this position.
    pub fn add_data_point(&mut self, point: Point2d, value: f64) -> Option<f64> {
        self.data_points
            .insert(PointKey::new(&point), (point, value))
            .map(|(_, v)| v)
    }

    /// Iterates over the data points in arbitrary order.
    pub fn data_points(&self) -> impl Iterator<Item = (&Point2d, f64)> {
        self.data_points.values().map(|(p, v)| (p, *v))
    }

    /// Number of data points.
    pub fn data_point_count(&self) -> usize {
        self.data_points.len()
    }

    /// Extent of the grid.
    pub fn extent(&self) -> Rect {
        self.extent
    }

    /// Cell size.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Value of cells without data.
    pub fn no_data_value(&self) -> f64 {
        self.no_data_value
    }

    /// Number of columns.
    pub fn columns(&self) -> usize {
        (self.extent.width() / self.cell_size).ceil() as usize
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        (self.extent.height() / self.cell_size).ceil() as usize
    }

    /// Extent of the cell. Row 0 is the top (northern-most) row.
    pub fn cell_extent(&self, row: usize, column: usize) -> Rect {
        let x_min = self.extent.x_min() + column as f64 * self.cell_size;
        let y_max = self.extent.y_max() - row as f64 * self.cell_size;
        Rect::new(x_min, y_max - self.cell_size, x_min + self.cell_size, y_max)
    }

    /// Centre of the cell.
    pub fn cell_center(&self, row: usize, column: usize) -> Point2d {
        let x = self.extent.x_min() + (column as f64 + 0.5) * self.cell_size;
        let y = self.extent.y_max() - (row as f64 + 0.5) * self.cell_size;
        Point2d::new(x, y)
    }
}
