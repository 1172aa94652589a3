use std::io::Write;

use log::debug;
use rayon::prelude::*;

use crate::definition::GridDefinition;
use crate::error::GridError;
use crate::interpolation::GridInterpolationModel;
use crate::matrix::GridMatrix;

/// Computes the values of all cells of the grid.
///
/// Rows are evaluated in parallel, each by one task, so every cell is written exactly once and no locking is
/// needed. Values that are not finite numbers are replaced with the no-data value of the definition.
pub fn generate_grid<M>(definition: &GridDefinition, model: &M) -> Result<GridMatrix, GridError>
where
    M: GridInterpolationModel + ?Sized,
{
    let rows = definition.rows();
    let columns = definition.columns();
    debug!(
        "Generating {rows}x{columns} grid from {} data points",
        definition.data_point_count()
    );

    let values: Vec<Vec<f64>> = (0..rows)
        .into_par_iter()
        .map(|row| {
            (0..columns)
                .map(|column| {
                    let value = model.interpolate(&definition.cell_extent(row, column), definition);
                    if value.is_finite() {
                        value
                    } else {
                        definition.no_data_value()
                    }
                })
                .collect()
        })
        .collect();

    GridMatrix::from_values(definition, values.into_iter().flatten().collect())
}

/// Computes the grid and writes it in the ESRI ASCII grid format.
pub fn write_grid<M>(
    definition: &GridDefinition,
    model: &M,
    writer: &mut impl Write,
) -> Result<(), GridError>
where
    M: GridInterpolationModel + ?Sized,
{
    generate_grid(definition, model)?.write_ascii(writer)
}

#[cfg(test)]
mod tests {
    use featurekit_types::cartesian::{Point2d, Rect};

    use super::*;
    use crate::interpolation::IdwModel;

    #[test]
    fn cells_are_in_row_major_order() {
        let definition = GridDefinition::new(Rect::new(0.0, 0.0, 4.0, 3.0), 1.0, -1.0).unwrap();
        let model =
            |extent: &Rect, _: &GridDefinition| extent.center().x * 10.0 + extent.center().y;
        let grid = generate_grid(&definition, &model).unwrap();

        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 4);
        for row in 0..3 {
            for column in 0..4 {
                let cell = grid.get(row, column).unwrap();
                assert_eq!(cell.value, cell.center_x * 10.0 + cell.center_y);
            }
        }
        assert_eq!(grid.get(0, 0).unwrap().center_y, 2.5);
    }

    #[test]
    fn failed_cells_are_no_data() {
        let definition = GridDefinition::new(Rect::new(0.0, 0.0, 2.0, 2.0), 1.0, -1.0).unwrap();
        let model = |extent: &Rect, _: &GridDefinition| {
            if extent.x_min() == 0.0 {
                f64::NAN
            } else {
                1.0
            }
        };
        let grid = generate_grid(&definition, &model).unwrap();
        let values: Vec<f64> = grid.cells().iter().map(|c| c.value).collect();
        assert_eq!(values, vec![-1.0, 1.0, -1.0, 1.0]);
    }

    #[test]
    fn write_idw_grid() {
        let definition = GridDefinition::new(Rect::new(0.0, 0.0, 3.0, 3.0), 1.0, -9999.0)
            .unwrap()
            .with_data_points([(Point2d::new(1.5, 1.5), 5.0)]);

        let mut buf = vec![];
        write_grid(&definition, &IdwModel::default(), &mut buf).unwrap();

        let grid = GridMatrix::read_ascii(buf.as_slice()).unwrap();
        assert!(grid.cells().iter().all(|c| c.value == 5.0));
    }
}
