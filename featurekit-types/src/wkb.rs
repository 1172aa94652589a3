//! Well-known binary (OGC WKB) encoding and decoding of [`Geom`] values.
//!
//! Only 2-D geometries are supported: Point, LineString, Polygon, MultiPoint, MultiLineString and MultiPolygon.
//! Rings are written with the first vertex repeated at the end, as OGC requires, and the repeated vertex is stripped
//! when reading (see [`ClosedContour`]).

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use crate::cartesian::{CartesianPoint2d, Point2d};
use crate::contour::{ClosedContour, Contour};
use crate::error::TypesError;
use crate::geometry::Geom;
use crate::multi_contour::MultiContour;
use crate::multi_point::MultiPoint;
use crate::multi_polygon::MultiPolygon;
use crate::polygon::Polygon;

const POINT_SIZE: usize = 16;

/// Byte order tag of a WKB geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum WkbByteOrder {
    /// XDR, tag `0`.
    BigEndian,
    /// NDR, tag `1`.
    LittleEndian,
}

impl WkbByteOrder {
    /// Value of the first byte of a WKB geometry.
    pub fn tag(self) -> u8 {
        match self {
            WkbByteOrder::BigEndian => 0,
            WkbByteOrder::LittleEndian => 1,
        }
    }

    /// Parses the byte order tag.
    pub fn from_tag(tag: u8) -> Result<Self, TypesError> {
        match tag {
            0 => Ok(WkbByteOrder::BigEndian),
            1 => Ok(WkbByteOrder::LittleEndian),
            v => Err(TypesError::Wkb(format!("invalid byte order flag {v}"))),
        }
    }
}

/// Geometry type codes of the WKB format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum WkbGeometryType {
    /// Point.
    Point = 1,
    /// LineString.
    LineString = 2,
    /// Polygon.
    Polygon = 3,
    /// MultiPoint.
    MultiPoint = 4,
    /// MultiLineString.
    MultiLineString = 5,
    /// MultiPolygon.
    MultiPolygon = 6,
}

impl WkbGeometryType {
    /// Numeric code of the type.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Returns the type with the given code, or `None` if the code is not supported.
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            1 => Self::Point,
            2 => Self::LineString,
            3 => Self::Polygon,
            4 => Self::MultiPoint,
            5 => Self::MultiLineString,
            6 => Self::MultiPolygon,
            _ => return None,
        })
    }

    /// WKB type of the given geometry.
    pub fn of<P>(geom: &Geom<P>) -> Self {
        match geom {
            Geom::Point(_) => Self::Point,
            Geom::MultiPoint(_) => Self::MultiPoint,
            Geom::Contour(_) => Self::LineString,
            Geom::MultiContour(_) => Self::MultiLineString,
            Geom::Polygon(_) => Self::Polygon,
            Geom::MultiPolygon(_) => Self::MultiPolygon,
        }
    }
}

/// Encodes the geometry as little-endian WKB.
pub fn encode<P: CartesianPoint2d<Num = f64>>(geom: &Geom<P>) -> Vec<u8> {
    encode_with_byte_order(geom, WkbByteOrder::LittleEndian)
}

/// Encodes the geometry as WKB with the given byte order.
pub fn encode_with_byte_order<P: CartesianPoint2d<Num = f64>>(
    geom: &Geom<P>,
    byte_order: WkbByteOrder,
) -> Vec<u8> {
    let mut writer = WkbWriter {
        buf: Vec::new(),
        byte_order,
    };
    writer.write_geom(geom);
    writer.buf
}

struct WkbWriter {
    buf: Vec<u8>,
    byte_order: WkbByteOrder,
}

impl WkbWriter {
    fn write_u32(&mut self, v: u32) {
        match self.byte_order {
            WkbByteOrder::BigEndian => self.buf.extend_from_slice(&v.to_be_bytes()),
            WkbByteOrder::LittleEndian => self.buf.extend_from_slice(&v.to_le_bytes()),
        }
    }

    fn write_f64(&mut self, v: f64) {
        match self.byte_order {
            WkbByteOrder::BigEndian => self.buf.extend_from_slice(&v.to_be_bytes()),
            WkbByteOrder::LittleEndian => self.buf.extend_from_slice(&v.to_le_bytes()),
        }
    }

    fn write_header(&mut self, geometry_type: WkbGeometryType) {
        self.buf.push(self.byte_order.tag());
        self.write_u32(geometry_type.code());
    }

    fn write_len(&mut self, len: usize) {
        self.write_u32(len as u32);
    }

    fn write_point<P: CartesianPoint2d<Num = f64>>(&mut self, p: &P) {
        self.write_f64(p.x());
        self.write_f64(p.y());
    }

    fn write_points<'a, P: CartesianPoint2d<Num = f64> + 'a>(
        &mut self,
        len: usize,
        points: impl Iterator<Item = &'a P>,
    ) {
        self.write_len(len);
        for p in points {
            self.write_point(p);
        }
    }

    fn write_line<P: CartesianPoint2d<Num = f64>>(&mut self, contour: &Contour<P>) {
        self.write_header(WkbGeometryType::LineString);
        let len = contour.iter_points_closing().count();
        self.write_points(len, contour.iter_points_closing());
    }

    fn write_polygon<P: CartesianPoint2d<Num = f64>>(&mut self, polygon: &Polygon<P>) {
        self.write_header(WkbGeometryType::Polygon);
        self.write_len(polygon.inner_contours.len() + 1);
        for ring in polygon.iter_contours() {
            let len = if ring.is_empty() { 0 } else { ring.len() + 1 };
            self.write_points(len, ring.iter_points_closing());
        }
    }

    fn write_geom<P: CartesianPoint2d<Num = f64>>(&mut self, geom: &Geom<P>) {
        match geom {
            Geom::Point(p) => {
                self.write_header(WkbGeometryType::Point);
                self.write_point(p);
            }
            Geom::MultiPoint(points) => {
                self.write_header(WkbGeometryType::MultiPoint);
                self.write_len(points.0.len());
                for p in points.iter_points() {
                    self.write_header(WkbGeometryType::Point);
                    self.write_point(p);
                }
            }
            Geom::Contour(contour) => self.write_line(contour),
            Geom::MultiContour(lines) => {
                self.write_header(WkbGeometryType::MultiLineString);
                self.write_len(lines.0.len());
                for line in lines.contours() {
                    self.write_line(line);
                }
            }
            Geom::Polygon(polygon) => self.write_polygon(polygon),
            Geom::MultiPolygon(polygons) => {
                self.write_header(WkbGeometryType::MultiPolygon);
                self.write_len(polygons.0.len());
                for polygon in polygons.polygons() {
                    self.write_polygon(polygon);
                }
            }
        }
    }
}

/// Decodes a WKB buffer. Both byte orders are accepted, also mixed within one multi-geometry.
pub fn decode(bytes: &[u8]) -> Result<Geom<Point2d>, TypesError> {
    let mut cursor = Cursor::new(bytes);
    let geom = read_geom(&mut cursor)?;

    let trailing = bytes.len() as u64 - cursor.position();
    if trailing > 0 {
        return Err(TypesError::Wkb(format!(
            "{trailing} unexpected bytes after the geometry"
        )));
    }

    Ok(geom)
}

fn read_geom(cursor: &mut Cursor<&[u8]>) -> Result<Geom<Point2d>, TypesError> {
    match WkbByteOrder::from_tag(cursor.read_u8()?)? {
        WkbByteOrder::BigEndian => read_geom_body::<BigEndian>(cursor),
        WkbByteOrder::LittleEndian => read_geom_body::<LittleEndian>(cursor),
    }
}

/// Reads a nested geometry and checks that it has the expected type.
fn read_member(
    cursor: &mut Cursor<&[u8]>,
    expected: WkbGeometryType,
) -> Result<Geom<Point2d>, TypesError> {
    let geom = read_geom(cursor)?;
    let actual = WkbGeometryType::of(&geom);
    if actual != expected {
        return Err(TypesError::Wkb(format!(
            "expected {expected:?} inside a multi-geometry, got {actual:?}"
        )));
    }

    Ok(geom)
}

fn read_geom_body<B: ByteOrder>(cursor: &mut Cursor<&[u8]>) -> Result<Geom<Point2d>, TypesError> {
    let code = cursor.read_u32::<B>()?;
    let Some(geometry_type) = WkbGeometryType::from_code(code) else {
        return Err(TypesError::Wkb(format!(
            "unsupported geometry type code {code}"
        )));
    };

    Ok(match geometry_type {
        WkbGeometryType::Point => Geom::Point(read_point::<B>(cursor)?),
        WkbGeometryType::LineString => Geom::Contour(Contour::open(read_points::<B>(cursor)?)),
        WkbGeometryType::Polygon => Geom::Polygon(read_polygon::<B>(cursor)?),
        WkbGeometryType::MultiPoint => {
            let count = read_count::<B>(cursor, 1 + 4 + POINT_SIZE)?;
            let mut points = Vec::with_capacity(count);
            for _ in 0..count {
                if let Geom::Point(p) = read_member(cursor, WkbGeometryType::Point)? {
                    points.push(p);
                }
            }
            Geom::MultiPoint(MultiPoint(points))
        }
        WkbGeometryType::MultiLineString => {
            let count = read_count::<B>(cursor, 1 + 4 + 4)?;
            let mut lines = Vec::with_capacity(count);
            for _ in 0..count {
                if let Geom::Contour(c) = read_member(cursor, WkbGeometryType::LineString)? {
                    lines.push(c);
                }
            }
            Geom::MultiContour(MultiContour(lines))
        }
        WkbGeometryType::MultiPolygon => {
            let count = read_count::<B>(cursor, 1 + 4 + 4)?;
            let mut polygons = Vec::with_capacity(count);
            for _ in 0..count {
                if let Geom::Polygon(p) = read_member(cursor, WkbGeometryType::Polygon)? {
                    polygons.push(p);
                }
            }
            Geom::MultiPolygon(MultiPolygon(polygons))
        }
    })
}

/// Reads an element count and checks it against the bytes left in the buffer, so that a corrupted count cannot
/// trigger a huge allocation.
fn read_count<B: ByteOrder>(
    cursor: &mut Cursor<&[u8]>,
    min_item_size: usize,
) -> Result<usize, TypesError> {
    let count = cursor.read_u32::<B>()? as usize;
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if count.saturating_mul(min_item_size) > remaining {
        return Err(TypesError::Wkb(format!(
            "element count {count} does not fit into {remaining} remaining bytes"
        )));
    }

    Ok(count)
}

fn read_point<B: ByteOrder>(cursor: &mut impl Read) -> Result<Point2d, TypesError> {
    let x = cursor.read_f64::<B>()?;
    let y = cursor.read_f64::<B>()?;
    Ok(Point2d::new(x, y))
}

fn read_points<B: ByteOrder>(cursor: &mut Cursor<&[u8]>) -> Result<Vec<Point2d>, TypesError> {
    let count = read_count::<B>(cursor, POINT_SIZE)?;
    (0..count).map(|_| read_point::<B>(cursor)).collect()
}

fn read_polygon<B: ByteOrder>(cursor: &mut Cursor<&[u8]>) -> Result<Polygon<Point2d>, TypesError> {
    let ring_count = read_count::<B>(cursor, 4)?;
    if ring_count == 0 {
        return Ok(Polygon::default());
    }

    let outer_contour = ClosedContour::from_ring(read_points::<B>(cursor)?);
    let inner_contours = (1..ring_count)
        .map(|_| read_points::<B>(cursor).map(ClosedContour::from_ring))
        .collect::<Result<_, _>>()?;

    Ok(Polygon::new(outer_contour, inner_contours))
}
