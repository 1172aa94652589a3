use std::fmt::{Display, Formatter};

/// Shape type codes of the shapefile format.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ShapeFileType {
    /// Record without geometry.
    Null = 0,
    /// Single point.
    Point = 1,
    /// One or more lines.
    Polyline = 3,
    /// One or more rings.
    Polygon = 5,
    /// Set of points.
    MultiPoint = 8,
    /// Point with Z and M values.
    PointZ = 11,
    /// Polyline with Z and M values.
    PolylineZ = 13,
    /// Polygon with Z and M values.
    PolygonZ = 15,
    /// Multipoint with Z and M values.
    MultiPointZ = 18,
    /// Point with M value.
    PointM = 21,
    /// Polyline with M values.
    PolylineM = 23,
    /// Polygon with M values.
    PolygonM = 25,
    /// Multipoint with M values.
    MultiPointM = 28,
    /// Surface patches. Recognized but not supported.
    Multipatch = 31,
}

impl ShapeFileType {
    /// Code of the type as stored in the file.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Shape type with the given code, `None` for undefined codes.
    pub fn from_code(code: i32) -> Option<Self> {
        use ShapeFileType::*;
        Some(match code {
            0 => Null,
            1 => Point,
            3 => Polyline,
            5 => Polygon,
            8 => MultiPoint,
            11 => PointZ,
            13 => PolylineZ,
            15 => PolygonZ,
            18 => MultiPointZ,
            21 => PointM,
            23 => PolylineM,
            25 => PolygonM,
            28 => MultiPointM,
            31 => Multipatch,
            _ => return None,
        })
    }

    /// 2d type with the same record layout prefix. Z and M variants store X/Y data exactly as their 2d counterparts
    /// and add Z and M arrays after it.
    pub fn base(self) -> Self {
        use ShapeFileType::*;
        match self {
            PointZ | PointM => Point,
            PolylineZ | PolylineM => Polyline,
            PolygonZ | PolygonM => Polygon,
            MultiPointZ | MultiPointM => MultiPoint,
            v => v,
        }
    }

    /// Whether records of this type can be written.
    pub fn is_writable(self) -> bool {
        use ShapeFileType::*;
        matches!(self, Point | Polyline | Polygon | MultiPoint)
    }
}

impl Display for ShapeFileType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}
