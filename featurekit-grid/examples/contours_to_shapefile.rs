//! Interpolates a grid from a handful of spot heights, traces contour lines and writes them to a Polyline shapefile.
//!
//! ```text
//! cargo run --example contours_to_shapefile -- contours.shp
//! ```

use std::path::PathBuf;

use anyhow::Context;
use featurekit_grid::{generate_grid, GridDefinition, IdwModel, IsolineTracer};
use featurekit_shp::{ShapeFile, ShapeFileType};
use featurekit_types::cartesian::{Point2d, Rect};
use featurekit_types::Geom;

const SPOT_HEIGHTS: [(f64, f64, f64); 6] = [
    (10.0, 10.0, 120.0),
    (40.0, 15.0, 180.0),
    (25.0, 30.0, 240.0),
    (70.0, 40.0, 160.0),
    (55.0, 80.0, 300.0),
    (90.0, 90.0, 110.0),
];

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("contours.shp"));

    let definition = GridDefinition::new(Rect::new(0.0, 0.0, 100.0, 100.0), 2.0, -9999.0)?
        .with_data_points(
            SPOT_HEIGHTS
                .iter()
                .map(|&(x, y, height)| (Point2d::new(x, y), height)),
        );

    let model = IdwModel {
        power: 2.0,
        search_radius: Some(60.0),
        max_neighbors: Some(4),
    };
    let grid = generate_grid(&definition, &model)?;

    let levels: Vec<f64> = (1..15).map(|step| step as f64 * 20.0).collect();
    let isolines = IsolineTracer::new(&grid).trace_levels(&levels)?;

    let mut shapes = ShapeFile::create_overwrite(&path, ShapeFileType::Polyline)
        .with_context(|| format!("creating {}", path.display()))?;

    let mut count = 0;
    for isoline in isolines.iter().flatten() {
        if isoline.points.len() < 2 {
            continue;
        }

        shapes.add_shape(&Geom::Contour(isoline.to_contour()))?;
        count += 1;
    }
    shapes.close()?;

    log::info!("Wrote {count} contour lines to {}", path.display());
    Ok(())
}
