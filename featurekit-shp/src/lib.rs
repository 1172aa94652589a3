//! Reader and writer of ESRI shapefiles.
//!
//! A shapefile consists of a `.shp` file with the geometries and a `.shx` index file with the offsets of the records.
//! Only the geometry part of the format is supported: attribute (`.dbf`) files are not read or written.
//!
//! Geometries are exchanged as well-known binary (see [`featurekit_types::wkb`]) or as
//! [`Geom`](featurekit_types::Geom) values:
//!
//! ```no_run
//! use featurekit_shp::{FileAccess, ShapeFile};
//!
//! let mut shapes = ShapeFile::open("roads.shp", FileAccess::Read)?;
//! for id in 1..=shapes.record_count() {
//!     if let Some(geom) = shapes.read_shape(id)? {
//!         println!("{id}: {}", geom.kind_name());
//!     }
//! }
//! # Ok::<(), featurekit_shp::error::ShpError>(())
//! ```

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

pub use bounding_box::BoundingBox;
pub use header::ShapeFileHeader;
pub use index::ShapeFileIndex;
pub use shape_file::ShapeFile;
pub use shape_type::ShapeFileType;

use crate::error::ShpError;

mod bounding_box;
pub mod endian;
pub mod error;
pub mod header;
mod index;
mod record;
mod shape_file;
mod shape_type;

/// Mode in which shapefiles are opened.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum FileAccess {
    /// Records can only be read.
    #[default]
    Read,
    /// Records can be read, added, updated and deleted.
    ReadWrite,
}

/// Default stream loader: opens the file on disk.
pub(crate) fn open_file(path: &Path, access: FileAccess) -> std::io::Result<File> {
    File::options()
        .read(true)
        .write(access == FileAccess::ReadWrite)
        .open(path)
}

pub(crate) fn load_stream<S, F>(path: &Path, access: FileAccess, loader: F) -> Result<S, ShpError>
where
    F: FnOnce(&Path, FileAccess) -> std::io::Result<S>,
{
    loader(path, access).map_err(|err| match err.kind() {
        ErrorKind::NotFound => ShpError::FileNotFound(path.into()),
        _ => ShpError::Io(err),
    })
}
