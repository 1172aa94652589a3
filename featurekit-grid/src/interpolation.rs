//! Interpolation of cell values from the data points of a grid definition.

use featurekit_types::cartesian::{CartesianPoint2d, Rect};
use serde::{Deserialize, Serialize};

use crate::definition::GridDefinition;

/// Strategy computing the value of one grid cell.
///
/// Implementations must be thread safe: cells are evaluated in parallel. A model that cannot produce a value for a
/// cell should return the no-data value of the definition.
pub trait GridInterpolationModel: Sync {
    /// Value of the cell with the given extent.
    fn interpolate(&self, cell_extent: &Rect, definition: &GridDefinition) -> f64;
}

impl<F> GridInterpolationModel for F
where
    F: Fn(&Rect, &GridDefinition) -> f64 + Sync,
{
    fn interpolate(&self, cell_extent: &Rect, definition: &GridDefinition) -> f64 {
        self(cell_extent, definition)
    }
}

/// Inverse distance weighting.
///
/// The value of a cell is the weighted average of the data point values, with weights `1 / d^power`, where `d` is the
/// distance from the cell centre to the data point. A data point at the cell centre gives its value directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdwModel {
    /// Power of the distance in the weight.
    pub power: f64,
    /// Only data points closer than this distance are used.
    pub search_radius: Option<f64>,
    /// Only this number of the nearest data points is used.
    pub max_neighbors: Option<usize>,
}

impl Default for IdwModel {
    fn default() -> Self {
        Self {
            power: 2.0,
            search_radius: None,
            max_neighbors: None,
        }
    }
}

impl GridInterpolationModel for IdwModel {
    fn interpolate(&self, cell_extent: &Rect, definition: &GridDefinition) -> f64 {
        let center = cell_extent.center();
        let radius_sq = self.search_radius.map(|r| r * r);

        let mut neighbors = Vec::new();
        for (point, value) in definition.data_points() {
            let distance_sq = point.distance_sq(&center);
            if distance_sq == 0.0 {
                return value;
            }

            if radius_sq.is_none_or(|r| distance_sq <= r) {
                neighbors.push((distance_sq, value));
            }
        }

        if let Some(max) = self.max_neighbors {
            if neighbors.len() > max {
                neighbors.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
                neighbors.truncate(max);
            }
        }

        if neighbors.is_empty() {
            return definition.no_data_value();
        }

        let half_power = self.power / 2.0;
        let (weighted, total_weight) =
            neighbors
                .iter()
                .fold((0.0, 0.0), |(weighted, total), (distance_sq, value)| {
                    let weight = 1.0 / distance_sq.powf(half_power);
                    (weighted + weight * value, total + weight)
                });

        weighted / total_weight
    }
}
