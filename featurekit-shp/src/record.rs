//! Conversion between the content of shapefile records and geometries.
//!
//! Record content starts with the little-endian shape type code, followed by the type specific payload:
//!
//! * Point: `x, y`
//! * MultiPoint: `bbox, num_points, points[num_points]`
//! * Polyline, Polygon: `bbox, num_parts, num_points, parts[num_parts], points[num_points]`
//!
//! Z and M variants have the same prefix followed by Z and M data, which is ignored.

use std::io::{Cursor, Read};
use std::ops::Range;

use featurekit_types::cartesian::{Point2d, Rect};
use featurekit_types::{
    ClosedContour, Contour, Geom, MultiContour, MultiPoint, MultiPolygon, Polygon, Winding,
};
use log::warn;

use crate::bounding_box::BoundingBox;
use crate::endian::{read_f64, read_i32, write_f64, write_i32, Endian};
use crate::error::ShpError;
use crate::shape_type::ShapeFileType;

const POINT_SIZE: usize = 16;

/// Shape type code at the start of the record content.
pub(crate) fn record_shape_type(content: &[u8]) -> Result<ShapeFileType, ShpError> {
    let mut cursor = Cursor::new(content);
    read_shape_type(&mut cursor)
}

/// Parses the record content. Returns `None` for Null shapes.
pub(crate) fn read_shape(
    content: &[u8],
    file_type: ShapeFileType,
) -> Result<Option<Geom<Point2d>>, ShpError> {
    let mut cursor = Cursor::new(content);
    let record_type = read_shape_type(&mut cursor)?;
    if record_type == ShapeFileType::Null {
        return Ok(None);
    }

    check_record_type(file_type, record_type)?;

    let geom = match record_type.base() {
        ShapeFileType::Point => Geom::Point(read_point(&mut cursor)?),
        ShapeFileType::MultiPoint => {
            let layout = read_layout(&mut cursor, false)?;
            Geom::MultiPoint(MultiPoint(read_points(&mut cursor, layout.num_points)?))
        }
        ShapeFileType::Polyline => {
            let layout = read_layout(&mut cursor, true)?;
            let points = read_points(&mut cursor, layout.num_points)?;
            let mut lines: Vec<_> = layout
                .parts
                .into_iter()
                .map(|range| Contour::open(points[range].to_vec()))
                .collect();

            if lines.len() == 1 {
                Geom::Contour(lines.remove(0))
            } else {
                Geom::MultiContour(MultiContour(lines))
            }
        }
        ShapeFileType::Polygon => {
            let layout = read_layout(&mut cursor, true)?;
            let points = read_points(&mut cursor, layout.num_points)?;
            let rings = layout
                .parts
                .into_iter()
                .map(|range| ClosedContour::from_ring(points[range].to_vec()))
                .collect();

            let mut polygons = assemble_polygons(rings)?;
            if polygons.len() == 1 {
                Geom::Polygon(polygons.remove(0))
            } else {
                Geom::MultiPolygon(MultiPolygon(polygons))
            }
        }
        ShapeFileType::Multipatch => return Err(ShpError::UnsupportedMultipatch),
        other => {
            return Err(ShpError::InvalidData(format!(
                "no reader for shape type {other}"
            )))
        }
    };

    Ok(Some(geom))
}

/// Checks that the record content is consistent without building the geometry.
pub(crate) fn check_layout(content: &[u8], file_type: ShapeFileType) -> Result<(), ShpError> {
    let mut cursor = Cursor::new(content);
    let record_type = read_shape_type(&mut cursor)?;
    if record_type == ShapeFileType::Null {
        return Ok(());
    }

    check_record_type(file_type, record_type)?;
    match record_type.base() {
        ShapeFileType::Point => {
            read_point(&mut cursor)?;
        }
        ShapeFileType::MultiPoint => {
            read_layout(&mut cursor, false)?;
        }
        ShapeFileType::Polyline | ShapeFileType::Polygon => {
            read_layout(&mut cursor, true)?;
        }
        _ => return Err(ShpError::UnsupportedMultipatch),
    }

    Ok(())
}

/// Bounding box stored in the record. For point records it is the point itself.
pub(crate) fn read_bounding_box(
    content: &[u8],
    file_type: ShapeFileType,
) -> Result<Option<BoundingBox>, ShpError> {
    let mut cursor = Cursor::new(content);
    let record_type = read_shape_type(&mut cursor)?;
    if record_type == ShapeFileType::Null {
        return Ok(None);
    }

    check_record_type(file_type, record_type)?;
    match record_type.base() {
        ShapeFileType::Point => {
            let point = read_point(&mut cursor)?;
            Ok(Some(BoundingBox::new(point.x, point.y, point.x, point.y)))
        }
        ShapeFileType::Multipatch => Err(ShpError::UnsupportedMultipatch),
        _ => Ok(Some(BoundingBox::read_from(&mut cursor)?)),
    }
}

/// Encodes the geometry as record content of a file with the given shape type.
///
/// Single lines and polygons are written as one-part polylines and polygons. Polygon rings are reoriented: outer
/// rings clockwise, holes counterclockwise.
pub(crate) fn write_shape(
    geom: &Geom<Point2d>,
    file_type: ShapeFileType,
) -> Result<Vec<u8>, ShpError> {
    if !file_type.is_writable() {
        return Err(ShpError::UnsupportedWrite(file_type));
    }

    let mut buf = vec![];
    match (file_type, geom) {
        (ShapeFileType::Point, Geom::Point(p)) => {
            write_i32(&mut buf, ShapeFileType::Point.code(), Endian::Little)?;
            write_point(&mut buf, p)?;
        }
        (ShapeFileType::MultiPoint, Geom::Point(p)) => {
            write_multipoint(&mut buf, std::slice::from_ref(p))?;
        }
        (ShapeFileType::MultiPoint, Geom::MultiPoint(points)) => {
            write_multipoint(&mut buf, &points.0)?;
        }
        (ShapeFileType::Polyline, Geom::Contour(contour)) => {
            write_parts(&mut buf, file_type, &[line_part(contour)])?;
        }
        (ShapeFileType::Polyline, Geom::MultiContour(lines)) => {
            let parts: Vec<_> = lines.contours().map(line_part).collect();
            write_parts(&mut buf, file_type, &parts)?;
        }
        (ShapeFileType::Polygon, Geom::Polygon(polygon)) => {
            write_parts(&mut buf, file_type, &polygon_parts(polygon))?;
        }
        (ShapeFileType::Polygon, Geom::MultiPolygon(polygons)) => {
            let parts: Vec<_> = polygons.polygons().flat_map(polygon_parts).collect();
            write_parts(&mut buf, file_type, &parts)?;
        }
        _ => {
            return Err(ShpError::GeometryMismatch {
                shape_type: file_type,
                geometry: geom.kind_name(),
            })
        }
    }

    Ok(buf)
}

/// Splits rings into outer rings and holes by their winding and puts every hole into the outer ring containing it.
///
/// A hole goes to the outer ring whose bounding box contains the hole's bounding box. If there are several such
/// rings, the first one (in file order) containing the first vertex of the hole is used. If none of them contains
/// the vertex, the first candidate is used.
fn assemble_polygons(
    rings: Vec<ClosedContour<Point2d>>,
) -> Result<Vec<Polygon<Point2d>>, ShpError> {
    let mut shells: Vec<(Polygon<Point2d>, Rect)> = vec![];
    let mut holes = vec![];

    for ring in rings {
        let Some(rect) = ring.bounding_rectangle() else {
            continue;
        };

        match ring.winding() {
            Winding::Clockwise => shells.push((ring.into(), rect)),
            Winding::CounterClockwise => holes.push((ring, rect)),
        }
    }

    for (hole, hole_rect) in holes {
        let candidates: Vec<usize> = shells
            .iter()
            .enumerate()
            .filter(|(_, (_, rect))| rect.contains_rect(&hole_rect))
            .map(|(i, _)| i)
            .collect();

        let shell_index = match candidates[..] {
            [] => {
                return Err(ShpError::InvalidData(
                    "inner ring is not inside any outer ring".into(),
                ))
            }
            [single] => single,
            [first, ..] => {
                let vertex = hole.points[0];
                candidates
                    .iter()
                    .copied()
                    .find(|&i| shells[i].0.outer_contour.contains_point(&vertex))
                    .unwrap_or_else(|| {
                        warn!("No outer ring contains the inner ring, using the first candidate");
                        first
                    })
            }
        };

        shells[shell_index].0.inner_contours.push(hole);
    }

    Ok(shells.into_iter().map(|(polygon, _)| polygon).collect())
}

fn line_part(contour: &Contour<Point2d>) -> Vec<Point2d> {
    contour.iter_points_closing().copied().collect()
}

fn polygon_parts(polygon: &Polygon<Point2d>) -> Vec<Vec<Point2d>> {
    let oriented = polygon.clone().oriented(Winding::Clockwise);
    oriented
        .iter_contours()
        .filter(|ring| !ring.is_empty())
        .map(|ring| ring.iter_points_closing().copied().collect())
        .collect()
}

fn write_null(buf: &mut Vec<u8>) -> Result<(), ShpError> {
    write_i32(buf, ShapeFileType::Null.code(), Endian::Little)?;
    Ok(())
}

fn write_point(buf: &mut Vec<u8>, point: &Point2d) -> Result<(), ShpError> {
    write_f64(buf, point.x, Endian::Little)?;
    write_f64(buf, point.y, Endian::Little)?;
    Ok(())
}

fn write_multipoint(buf: &mut Vec<u8>, points: &[Point2d]) -> Result<(), ShpError> {
    let Some(rect) = Rect::from_points(points.iter()) else {
        return write_null(buf);
    };

    write_i32(buf, ShapeFileType::MultiPoint.code(), Endian::Little)?;
    BoundingBox::from(rect).write_to(buf, false)?;
    write_i32(buf, count_to_i32(points.len())?, Endian::Little)?;
    for p in points {
        write_point(buf, p)?;
    }

    Ok(())
}

fn write_parts(
    buf: &mut Vec<u8>,
    shape_type: ShapeFileType,
    parts: &[Vec<Point2d>],
) -> Result<(), ShpError> {
    let Some(rect) = Rect::from_points(parts.iter().flatten()) else {
        return write_null(buf);
    };

    let num_points: usize = parts.iter().map(Vec::len).sum();

    write_i32(buf, shape_type.code(), Endian::Little)?;
    BoundingBox::from(rect).write_to(buf, false)?;
    write_i32(buf, count_to_i32(parts.len())?, Endian::Little)?;
    write_i32(buf, count_to_i32(num_points)?, Endian::Little)?;

    let mut start = 0;
    for part in parts {
        write_i32(buf, count_to_i32(start)?, Endian::Little)?;
        start += part.len();
    }

    for p in parts.iter().flatten() {
        write_point(buf, p)?;
    }

    Ok(())
}

fn count_to_i32(count: usize) -> Result<i32, ShpError> {
    i32::try_from(count).map_err(|_| ShpError::InvalidData(format!("too many elements: {count}")))
}

fn check_record_type(file_type: ShapeFileType, record_type: ShapeFileType) -> Result<(), ShpError> {
    if record_type == ShapeFileType::Multipatch {
        return Err(ShpError::UnsupportedMultipatch);
    }

    if record_type != file_type {
        return Err(ShpError::ShapeTypeMismatch {
            expected: file_type,
            actual: record_type,
        });
    }

    Ok(())
}

fn read_shape_type(cursor: &mut Cursor<&[u8]>) -> Result<ShapeFileType, ShpError> {
    let code = read_i32(cursor, Endian::Little).map_err(truncated)?;
    ShapeFileType::from_code(code).ok_or(ShpError::UnknownShapeType(code))
}

fn truncated(_: std::io::Error) -> ShpError {
    ShpError::InvalidData("record content is truncated".into())
}

fn read_point(reader: &mut impl Read) -> Result<Point2d, ShpError> {
    let x = read_f64(reader, Endian::Little).map_err(truncated)?;
    let y = read_f64(reader, Endian::Little).map_err(truncated)?;
    Ok(Point2d::new(x, y))
}

fn read_points(cursor: &mut Cursor<&[u8]>, count: usize) -> Result<Vec<Point2d>, ShpError> {
    (0..count).map(|_| read_point(cursor)).collect()
}

/// Counts and part ranges of a multipoint, polyline or polygon record.
struct RecordLayout {
    parts: Vec<Range<usize>>,
    num_points: usize,
}

/// Reads the record bounding box, the counts and the part indices, and checks that the points fit into the
/// remaining content. The cursor is left at the first point.
fn read_layout(cursor: &mut Cursor<&[u8]>, with_parts: bool) -> Result<RecordLayout, ShpError> {
    BoundingBox::read_from(cursor).map_err(truncated)?;

    let num_parts = if with_parts {
        read_count(cursor)?
    } else {
        0
    };
    let num_points = read_count(cursor)?;

    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    let required = num_parts
        .checked_mul(4)
        .zip(num_points.checked_mul(POINT_SIZE))
        .and_then(|(a, b)| a.checked_add(b));
    if required.is_none_or(|required| required > remaining) {
        return Err(ShpError::InvalidData(format!(
            "{num_parts} parts and {num_points} points do not fit into the record"
        )));
    }

    let mut starts = Vec::with_capacity(num_parts);
    for _ in 0..num_parts {
        starts.push(read_count(cursor)?);
    }

    let mut parts = Vec::with_capacity(num_parts);
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(num_points);
        if start > end || end > num_points {
            return Err(ShpError::InvalidData(format!(
                "invalid part index {start} in a record with {num_points} points"
            )));
        }
        parts.push(start..end);
    }

    Ok(RecordLayout { parts, num_points })
}

fn read_count(cursor: &mut Cursor<&[u8]>) -> Result<usize, ShpError> {
    let count = read_i32(cursor, Endian::Little).map_err(truncated)?;
    usize::try_from(count).map_err(|_| ShpError::InvalidData(format!("negative count {count}")))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn ring(points: &[(f64, f64)]) -> ClosedContour<Point2d> {
        ClosedContour::new(points.iter().map(|&(x, y)| Point2d::new(x, y)).collect())
    }

    fn square(x: f64, y: f64, size: f64) -> ClosedContour<Point2d> {
        ring(&[(x, y), (x + size, y), (x + size, y + size), (x, y + size)])
    }

    #[test]
    fn point_record() {
        let geom = Geom::Point(Point2d::new(1.5, -2.0));
        let content = write_shape(&geom, ShapeFileType::Point).unwrap();
        assert_eq!(content.len(), 20);
        assert_eq!(&content[0..4], &[1, 0, 0, 0]);
        assert_eq!(
            read_shape(&content, ShapeFileType::Point).unwrap(),
            Some(geom)
        );
        assert_eq!(
            read_bounding_box(&content, ShapeFileType::Point).unwrap(),
            Some(BoundingBox::new(1.5, -2.0, 1.5, -2.0))
        );
    }

    #[test]
    fn polygon_record_layout() {
        let polygon: Geom<Point2d> = Polygon::new(square(0.0, 0.0, 10.0), vec![]).into();
        let content = write_shape(&polygon, ShapeFileType::Polygon).unwrap();

        // type, bbox, num_parts, num_points, 1 part index, 5 points
        assert_eq!(content.len(), 4 + 32 + 4 + 4 + 4 + 5 * 16);
        assert_eq!(&content[36..40], &1i32.to_le_bytes());
        assert_eq!(&content[40..44], &5i32.to_le_bytes());

        let Some(Geom::Polygon(read)) = read_shape(&content, ShapeFileType::Polygon).unwrap()
        else {
            panic!("expected polygon");
        };
        assert_eq!(read.outer_contour.winding(), Winding::Clockwise);
        assert_eq!(read.outer_contour.len(), 4);
    }

    #[test]
    fn holes_are_assigned_to_containing_shells() {
        let polygons: Geom<Point2d> = MultiPolygon(vec![
            Polygon::new(square(0.0, 0.0, 10.0), vec![square(2.0, 2.0, 1.0)]),
            Polygon::new(
                square(20.0, 0.0, 10.0),
                vec![square(21.0, 1.0, 1.0), square(25.0, 5.0, 2.0)],
            ),
        ])
        .into();

        let content = write_shape(&polygons, ShapeFileType::Polygon).unwrap();
        let Some(Geom::MultiPolygon(read)) =
            read_shape(&content, ShapeFileType::Polygon).unwrap()
        else {
            panic!("expected multipolygon");
        };

        assert_eq!(read.0.len(), 2);
        assert_eq!(read.0[0].inner_contours.len(), 1);
        assert_eq!(read.0[1].inner_contours.len(), 2);
        for polygon in &read.0 {
            assert_eq!(polygon.outer_contour.winding(), Winding::Clockwise);
            for hole in &polygon.inner_contours {
                assert_eq!(hole.winding(), Winding::CounterClockwise);
            }
        }
    }

    #[test]
    fn ambiguous_hole_uses_point_in_ring() {
        // L-shaped shell whose bounding box covers the second shell
        let l_shape = ring(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (2.0, 10.0),
            (2.0, 2.0),
            (10.0, 2.0),
            (10.0, 0.0),
        ]);
        let inner_shell = ring(&[(5.0, 5.0), (5.0, 9.0), (9.0, 9.0), (9.0, 5.0)]);
        let hole = ring(&[(6.0, 6.0), (8.0, 6.0), (8.0, 8.0), (6.0, 8.0)]);

        let polygons = assemble_polygons(vec![l_shape, inner_shell, hole]).unwrap();
        assert_eq!(polygons.len(), 2);
        assert!(polygons[0].inner_contours.is_empty());
        assert_eq!(polygons[1].inner_contours.len(), 1);
    }

    #[test]
    fn orphan_hole_is_an_error() {
        let shell = square(0.0, 0.0, 1.0).with_winding(Winding::Clockwise);
        let hole = square(5.0, 5.0, 1.0);
        assert_matches!(
            assemble_polygons(vec![shell, hole]),
            Err(ShpError::InvalidData(_))
        );
    }

    #[test]
    fn unclosed_rings_are_closed() {
        let mut content = vec![];
        write_i32(&mut content, 5, Endian::Little).unwrap();
        BoundingBox::new(0.0, 0.0, 1.0, 1.0)
            .write_to(&mut content, false)
            .unwrap();
        write_i32(&mut content, 1, Endian::Little).unwrap();
        write_i32(&mut content, 3, Endian::Little).unwrap();
        write_i32(&mut content, 0, Endian::Little).unwrap();
        for (x, y) in [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0)] {
            write_point(&mut content, &Point2d::new(x, y)).unwrap();
        }

        let Some(Geom::Polygon(polygon)) = read_shape(&content, ShapeFileType::Polygon).unwrap()
        else {
            panic!("expected polygon");
        };
        assert_eq!(polygon.outer_contour.len(), 3);
        assert_eq!(polygon.outer_contour.iter_segments().count(), 3);
    }

    #[test]
    fn polyline_parts() {
        let line = Contour::open(vec![Point2d::new(0.0, 0.0), Point2d::new(1.0, 2.0)]);
        let content = write_shape(&line.clone().into(), ShapeFileType::Polyline).unwrap();
        assert_eq!(
            read_shape(&content, ShapeFileType::Polyline).unwrap(),
            Some(Geom::Contour(line.clone()))
        );

        let lines: Geom<Point2d> = MultiContour(vec![line.clone(), line]).into();
        let content = write_shape(&lines, ShapeFileType::Polyline).unwrap();
        assert_eq!(&content[36..40], &2i32.to_le_bytes());
        assert_eq!(&content[48..52], &2i32.to_le_bytes());
        assert_eq!(
            read_shape(&content, ShapeFileType::Polyline).unwrap(),
            Some(lines)
        );
    }

    #[test]
    fn z_records_are_read_as_2d() {
        let mut content = vec![];
        write_i32(&mut content, ShapeFileType::PointZ.code(), Endian::Little).unwrap();
        for v in [3.0, 4.0, 100.0, 0.0] {
            write_f64(&mut content, v, Endian::Little).unwrap();
        }

        assert_eq!(
            read_shape(&content, ShapeFileType::PointZ).unwrap(),
            Some(Geom::Point(Point2d::new(3.0, 4.0)))
        );
        assert_matches!(
            write_shape(&Geom::Point(Point2d::new(0.0, 0.0)), ShapeFileType::PointZ),
            Err(ShpError::UnsupportedWrite(ShapeFileType::PointZ))
        );
    }

    #[test]
    fn invalid_records() {
        let point =
            write_shape(&Geom::Point(Point2d::new(0.0, 0.0)), ShapeFileType::Point).unwrap();
        assert_matches!(
            read_shape(&point, ShapeFileType::Polygon),
            Err(ShpError::ShapeTypeMismatch {
                expected: ShapeFileType::Polygon,
                actual: ShapeFileType::Point
            })
        );
        assert_matches!(
            read_shape(&point[..10], ShapeFileType::Point),
            Err(ShpError::InvalidData(_))
        );
        assert_matches!(
            read_shape(&[31, 0, 0, 0], ShapeFileType::Multipatch),
            Err(ShpError::UnsupportedMultipatch)
        );
        assert_matches!(
            check_layout(&[31, 0, 0, 0], ShapeFileType::Polygon),
            Err(ShpError::UnsupportedMultipatch)
        );
        assert_eq!(read_shape(&[0, 0, 0, 0], ShapeFileType::Point).unwrap(), None);

        let mut content = vec![];
        write_i32(&mut content, 8, Endian::Little).unwrap();
        BoundingBox::default().write_to(&mut content, false).unwrap();
        write_i32(&mut content, 1000, Endian::Little).unwrap();
        assert_matches!(
            check_layout(&content, ShapeFileType::MultiPoint),
            Err(ShpError::InvalidData(_))
        );

        assert_matches!(
            write_shape(
                &Contour::open(vec![Point2d::new(0.0, 0.0)]).into(),
                ShapeFileType::Point
            ),
            Err(ShpError::GeometryMismatch { .. })
        );
    }

    #[test]
    fn empty_geometry_is_written_as_null() {
        let empty: Geom<Point2d> = MultiPoint(vec![]).into();
        let content = write_shape(&empty, ShapeFileType::MultiPoint).unwrap();
        assert_eq!(content, [0, 0, 0, 0]);
    }
}
