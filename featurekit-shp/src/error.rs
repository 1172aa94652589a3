use std::path::PathBuf;

use featurekit_types::TypesError;
use thiserror::Error;

use crate::shape_type::ShapeFileType;

/// Errors of shapefile reading and writing.
#[derive(Debug, Error)]
pub enum ShpError {
    /// Underlying stream failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The first 4 bytes of the file are not the shapefile magic number.
    #[error("invalid file code {0}, expected 9994")]
    InvalidFileCode(i32),

    /// Shape type code not defined by the format.
    #[error("unknown shape type code {0}")]
    UnknownShapeType(i32),

    /// A record has a shape type other than the declared type of the file.
    #[error("record shape type {actual} does not match file shape type {expected}")]
    ShapeTypeMismatch {
        /// Shape type of the file.
        expected: ShapeFileType,
        /// Shape type found in the record.
        actual: ShapeFileType,
    },

    /// Geometry cannot be stored in a file of this shape type.
    #[error("{geometry} geometry cannot be written into a {shape_type} shapefile")]
    GeometryMismatch {
        /// Shape type of the file.
        shape_type: ShapeFileType,
        /// Kind of the rejected geometry.
        geometry: &'static str,
    },

    /// Multipatch records are recognized but their content is not supported.
    #[error("multipatch shapes are not supported")]
    UnsupportedMultipatch,

    /// Records can only be written into 2d shapefiles.
    #[error("writing into a {0} shapefile is not supported")]
    UnsupportedWrite(ShapeFileType),

    /// Record content is malformed.
    #[error("invalid record data: {0}")]
    InvalidData(String),

    /// Shapefile or its index does not exist.
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    /// Shapefile cannot be created because the file is already there.
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    /// There is no record with the given id.
    #[error("record {0} not found")]
    RecordNotFound(u32),

    /// The file was closed.
    #[error("shapefile is not open")]
    NotOpen,

    /// Modification of a file opened for reading.
    #[error("shapefile is opened in read-only mode")]
    ReadOnly,

    /// Geometry could not be encoded or decoded as WKB.
    #[error(transparent)]
    Wkb(#[from] TypesError),
}
