use featurekit_types::cartesian::CartesianPoint2d;
use serde::{Deserialize, Serialize};

/// Value of the scalar field at a point: a grid cell centre, or a point of an isoline.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    /// X coordinate of the point.
    pub center_x: f64,
    /// Y coordinate of the point.
    pub center_y: f64,
    /// Value at the point.
    pub value: f64,
}

impl GridCell {
    /// Creates a new cell.
    pub fn new(center_x: f64, center_y: f64, value: f64) -> Self {
        Self {
            center_x,
            center_y,
            value,
        }
    }
}

impl CartesianPoint2d for GridCell {
    type Num = f64;

    fn x(&self) -> f64 {
        self.center_x
    }

    fn y(&self) -> f64 {
        self.center_y
    }
}
