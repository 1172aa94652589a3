use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use featurekit_types::cartesian::Point2d;
use featurekit_types::{wkb, Geom};
use log::{debug, warn};

use crate::bounding_box::BoundingBox;
use crate::endian::{read_i32, write_i32, Endian};
use crate::error::ShpError;
use crate::header::{ShapeFileHeader, HEADER_SIZE};
use crate::index::{to_words, ShapeFileIndex};
use crate::shape_type::ShapeFileType;
use crate::{load_stream, open_file, record, FileAccess};

const RECORD_HEADER_SIZE: u64 = 8;

/// A pair of `.shp` and `.shx` streams.
///
/// Records are identified by 1-based ids, which are the positions of their entries in the index. Both streams are
/// always updated together: every write to the `.shp` stream is followed by the corresponding index change.
///
/// Deleted records keep their ids. Reading a deleted record returns `None`, the same as for records with Null shapes.
///
/// A shapefile opened with [`FileAccess::ReadWrite`] writes its headers on [`ShapeFile::close`]. If the file is
/// dropped without closing, the headers are written on drop and possible errors are only logged.
#[derive(Debug)]
pub struct ShapeFile<S: Read + Write + Seek = File> {
    shp: Option<S>,
    index: ShapeFileIndex<S>,
    header: ShapeFileHeader,
    access: FileAccess,
    shp_len: u64,
    // false while the header box is the placeholder of a file without records
    has_extent: bool,
}

impl ShapeFile<File> {
    /// Opens the `.shp` file at the given path and the `.shx` file next to it.
    pub fn open(path: impl AsRef<Path>, access: FileAccess) -> Result<Self, ShpError> {
        let path = path.as_ref();
        for required in [path.to_path_buf(), path.with_extension("shx")] {
            if !required.is_file() {
                return Err(ShpError::FileNotFound(required));
            }
        }

        Self::open_with(path, access, open_file)
    }

    /// Creates a new empty shapefile. Fails if the `.shp` or the `.shx` file already exists.
    pub fn create(path: impl AsRef<Path>, shape_type: ShapeFileType) -> Result<Self, ShpError> {
        Self::create_on_disk(path.as_ref(), shape_type, false)
    }

    /// Creates a new empty shapefile, replacing existing files.
    pub fn create_overwrite(
        path: impl AsRef<Path>,
        shape_type: ShapeFileType,
    ) -> Result<Self, ShpError> {
        Self::create_on_disk(path.as_ref(), shape_type, true)
    }

    fn create_on_disk(
        path: &Path,
        shape_type: ShapeFileType,
        overwrite: bool,
    ) -> Result<Self, ShpError> {
        if !shape_type.is_writable() {
            return Err(ShpError::UnsupportedWrite(shape_type));
        }

        let shx_path = path.with_extension("shx");
        if !overwrite {
            for existing in [path, shx_path.as_path()] {
                if existing.exists() {
                    return Err(ShpError::AlreadyExists(existing.into()));
                }
            }
        }

        let create = |p: &Path| {
            File::options()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(p)
        };

        debug!("Creating {shape_type} shapefile {path:?}");
        Self::create_with_streams(create(path)?, create(&shx_path)?, shape_type)
    }
}

impl<S: Read + Write + Seek> ShapeFile<S> {
    /// Opens the shapefile using a custom stream loader.
    ///
    /// The loader is called twice: for the `.shp` path and for the `.shx` path (the same path with the extension
    /// replaced). A loader failing with [`std::io::ErrorKind::NotFound`] results in [`ShpError::FileNotFound`].
    pub fn open_with<F>(path: &Path, access: FileAccess, mut loader: F) -> Result<Self, ShpError>
    where
        F: FnMut(&Path, FileAccess) -> std::io::Result<S>,
    {
        let shp = load_stream(path, access, &mut loader)?;
        let shx = load_stream(&path.with_extension("shx"), access, &mut loader)?;

        debug!("Opening shapefile {path:?} with {access:?} access");
        Self::from_streams(shp, shx, access)
    }

    /// Opens a shapefile from already open streams.
    pub fn from_streams(mut shp: S, shx: S, access: FileAccess) -> Result<Self, ShpError> {
        let header = ShapeFileHeader::read_from(&mut shp)?;
        let shp_len = shp.seek(SeekFrom::End(0))?;
        let index = ShapeFileIndex::from_stream(shx, access)?;
        let has_extent = index.record_count() > 0;

        if index.header().shape_type != header.shape_type {
            warn!(
                "Shape type of the index ({}) differs from the shape type of the file ({})",
                index.header().shape_type,
                header.shape_type
            );
        }

        if header.file_length_bytes() != shp_len {
            warn!(
                "File length in the header ({}) does not match the stream length ({shp_len})",
                header.file_length_bytes()
            );
        }

        Ok(Self {
            shp: Some(shp),
            index,
            header,
            access,
            shp_len,
            has_extent,
        })
    }

    /// Writes headers of an empty shapefile into the given streams, which are expected to be empty.
    pub fn create_with_streams(
        mut shp: S,
        shx: S,
        shape_type: ShapeFileType,
    ) -> Result<Self, ShpError> {
        if !shape_type.is_writable() {
            return Err(ShpError::UnsupportedWrite(shape_type));
        }

        let header = ShapeFileHeader::new(shape_type);
        header.write_to(&mut shp)?;
        let index = ShapeFileIndex::create_in(shx, shape_type)?;

        Ok(Self {
            shp: Some(shp),
            index,
            header,
            access: FileAccess::ReadWrite,
            shp_len: HEADER_SIZE,
            has_extent: false,
        })
    }

    /// Header of the `.shp` file.
    pub fn header(&self) -> &ShapeFileHeader {
        &self.header
    }

    /// Shape type of the file.
    pub fn shape_type(&self) -> ShapeFileType {
        self.header.shape_type
    }

    /// Access mode the file was opened with.
    pub fn access(&self) -> FileAccess {
        self.access
    }

    /// Number of records, including deleted ones. Valid ids are `1..=record_count()`.
    pub fn record_count(&self) -> u32 {
        self.index.record_count()
    }

    /// Returns true until the file is closed.
    pub fn is_open(&self) -> bool {
        self.shp.is_some()
    }

    /// Writes headers (when opened for writing) and releases the streams. Closing a closed file does nothing.
    pub fn close(&mut self) -> Result<(), ShpError> {
        if !self.is_open() {
            return Ok(());
        }

        let result = match self.access {
            FileAccess::ReadWrite => self.flush(),
            FileAccess::Read => Ok(()),
        };

        self.shp = None;
        self.index.close();
        debug!("Shapefile closed");

        result
    }

    /// Closes the file and returns its `.shp` and `.shx` streams.
    pub fn into_streams(mut self) -> Result<(S, S), ShpError> {
        if self.access == FileAccess::ReadWrite {
            self.flush()?;
        }

        let shp = self.shp.take().ok_or(ShpError::NotOpen)?;
        let shx = self.index.close().ok_or(ShpError::NotOpen)?;
        Ok((shp, shx))
    }

    /// Writes headers of both files and flushes the streams.
    pub fn flush(&mut self) -> Result<(), ShpError> {
        self.check_writable()?;
        self.header.set_file_length_bytes(self.shp_len);

        let header = self.header.clone();
        let shp = self.shp_mut()?;
        header.write_to(shp)?;
        shp.flush()?;

        self.index.header_mut().bounding_box = self.header.bounding_box;
        self.index.flush()
    }

    /// Reads the record as little-endian WKB. Returns `None` for Null shapes and deleted records.
    pub fn read_record(&mut self, id: u32) -> Result<Option<Vec<u8>>, ShpError> {
        Ok(self.read_shape(id)?.map(|geom| wkb::encode(&geom)))
    }

    /// Reads the geometry of the record. Returns `None` for Null shapes and deleted records.
    ///
    /// Points are read as `Point`, multipoints as `MultiPoint`. Polylines with one part are read as `Contour`,
    /// others as `MultiContour`. Polygons with one outer ring are read as `Polygon`, others as `MultiPolygon`.
    pub fn read_shape(&mut self, id: u32) -> Result<Option<Geom<Point2d>>, ShpError> {
        match self.read_content(id)? {
            Some(content) => record::read_shape(&content, self.header.shape_type),
            None => Ok(None),
        }
    }

    /// Bounding box of the record. For point records it is the point itself.
    pub fn get_bounding_box_by_id(&mut self, id: u32) -> Result<Option<BoundingBox>, ShpError> {
        match self.read_content(id)? {
            Some(content) => record::read_bounding_box(&content, self.header.shape_type),
            None => Ok(None),
        }
    }

    /// Adds a record from WKB. Returns the id of the new record.
    pub fn add_record(&mut self, wkb: &[u8]) -> Result<u32, ShpError> {
        let geom = wkb::decode(wkb)?;
        self.add_shape(&geom)
    }

    /// Adds a record. Returns the id of the new record.
    pub fn add_shape(&mut self, geom: &Geom<Point2d>) -> Result<u32, ShpError> {
        self.check_writable()?;
        let content = record::write_shape(geom, self.header.shape_type)?;

        let offset = self.shp_len;
        let id = self.index.record_count() + 1;
        self.write_record_at(offset, id, &content)?;
        self.index.add_record(offset, content.len() as u32)?;

        self.merge_bounding_box(geom);
        Ok(id)
    }

    /// Replaces the record with the geometry from WKB.
    pub fn update_record(&mut self, id: u32, wkb: &[u8]) -> Result<(), ShpError> {
        let geom = wkb::decode(wkb)?;
        self.update_shape(id, &geom)
    }

    /// Replaces the geometry of the record.
    ///
    /// If the new content has the same size as the old one, it is written in place. Otherwise the record is
    /// appended at the end of the `.shp` file and the index entry is pointed to it, so that the content length in
    /// the `.shp` record header always matches the index.
    pub fn update_shape(&mut self, id: u32, geom: &Geom<Point2d>) -> Result<(), ShpError> {
        self.check_writable()?;
        let offset = self.index.get_record_offset(id)?;
        let content = record::write_shape(geom, self.header.shape_type)?;
        let capacity = self.slot_capacity(offset)?;

        let offset = if content.len() as u64 == capacity {
            offset
        } else {
            debug!(
                "Record {id} changes size from {capacity} to {} bytes, moving it to offset {}",
                content.len(),
                self.shp_len
            );
            self.shp_len
        };

        self.write_record_at(offset, id, &content)?;
        self.index.update_record(id, offset, content.len() as u32)?;

        self.merge_bounding_box(geom);
        Ok(())
    }

    /// Deletes the record. The index entry keeps its offset and gets zero content length, and the content of the
    /// record in the `.shp` file is zeroed, so the id of every other record stays the same.
    pub fn delete_record(&mut self, id: u32) -> Result<(), ShpError> {
        self.check_writable()?;
        let offset = self.index.get_record_offset(id)?;
        let capacity = self.slot_capacity(offset)?;
        self.index.delete_record(id)?;

        if capacity > 0 {
            let shp = self.shp_mut()?;
            shp.seek(SeekFrom::Start(offset + RECORD_HEADER_SIZE))?;
            shp.write_all(&vec![0; capacity as usize])?;
        }

        Ok(())
    }

    /// Checks that the record can be read. Returns `None` if it can, or the description of the problem.
    pub fn check_record_is_valid(&mut self, id: u32) -> Option<String> {
        let content = match self.read_content(id) {
            Ok(Some(content)) => content,
            Ok(None) => return None,
            Err(err) => return Some(format!("record {id}: {err}")),
        };

        let shape_type = self.header.shape_type;
        let result = record::check_layout(&content, shape_type).and_then(|_| {
            // Polygons can be structurally valid but still have holes outside of all outer rings.
            if shape_type.base() == ShapeFileType::Polygon {
                record::read_shape(&content, shape_type).map(|_| ())
            } else {
                Ok(())
            }
        });

        result.err().map(|err| format!("record {id}: {err}"))
    }

    /// Runs [`ShapeFile::check_record_is_valid`] for every record and returns ids and descriptions of the invalid
    /// ones.
    pub fn validate_all(&mut self) -> Vec<(u32, String)> {
        (1..=self.record_count())
            .filter_map(|id| self.check_record_is_valid(id).map(|message| (id, message)))
            .collect()
    }

    /// Shape type code of the record without parsing the rest of it. `None` for deleted records.
    pub fn record_shape_type(&mut self, id: u32) -> Result<Option<ShapeFileType>, ShpError> {
        match self.read_content(id)? {
            Some(content) => record::record_shape_type(&content).map(Some),
            None => Ok(None),
        }
    }

    fn read_content(&mut self, id: u32) -> Result<Option<Vec<u8>>, ShpError> {
        if !self.is_open() {
            return Err(ShpError::NotOpen);
        }

        let offset = self.index.get_record_offset(id)?;
        let len = self.index.get_record_content_length(id)? as u64;
        if len <= 4 {
            return Ok(None);
        }

        if offset + RECORD_HEADER_SIZE + len > self.shp_len {
            return Err(ShpError::InvalidData(format!(
                "record {id} at offset {offset} exceeds the end of the file"
            )));
        }

        let shp = self.shp_mut()?;
        shp.seek(SeekFrom::Start(offset + RECORD_HEADER_SIZE))?;
        let mut content = vec![0; len as usize];
        shp.read_exact(&mut content)?;

        Ok(Some(content))
    }

    /// Content length stored in the record header in the `.shp` file.
    fn slot_capacity(&mut self, offset: u64) -> Result<u64, ShpError> {
        if offset < HEADER_SIZE || offset + RECORD_HEADER_SIZE > self.shp_len {
            return Ok(0);
        }

        let shp = self.shp_mut()?;
        shp.seek(SeekFrom::Start(offset + 4))?;
        let words = read_i32(shp, Endian::Big)?;
        Ok(words.max(0) as u64 * 2)
    }

    /// Writes the record header and the content.
    fn write_record_at(&mut self, offset: u64, id: u32, content: &[u8]) -> Result<(), ShpError> {
        let record_number = i32::try_from(id)
            .map_err(|_| ShpError::InvalidData(format!("record number {id} is too large")))?;
        let content_len = content.len() as u64;
        let content_words = to_words(content_len)?;
        to_words(offset + RECORD_HEADER_SIZE + content_len)?;

        let shp = self.shp_mut()?;
        shp.seek(SeekFrom::Start(offset))?;
        write_i32(shp, record_number, Endian::Big)?;
        write_i32(shp, content_words, Endian::Big)?;
        shp.write_all(content)?;

        self.shp_len = self.shp_len.max(offset + RECORD_HEADER_SIZE + content_len);
        self.header.set_file_length_bytes(self.shp_len);
        Ok(())
    }

    fn merge_bounding_box(&mut self, geom: &Geom<Point2d>) {
        let Some(rect) = geom.bounding_rectangle() else {
            return;
        };

        if self.has_extent {
            self.header.bounding_box.extend(&rect.into());
        } else {
            self.header.bounding_box = rect.into();
            self.has_extent = true;
        }
    }

    fn shp_mut(&mut self) -> Result<&mut S, ShpError> {
        self.shp.as_mut().ok_or(ShpError::NotOpen)
    }

    fn check_writable(&self) -> Result<(), ShpError> {
        if !self.is_open() {
            return Err(ShpError::NotOpen);
        }

        match self.access {
            FileAccess::ReadWrite => Ok(()),
            FileAccess::Read => Err(ShpError::ReadOnly),
        }
    }
}

impl<S: Read + Write + Seek> Drop for ShapeFile<S> {
    fn drop(&mut self) {
        if self.is_open() && self.access == FileAccess::ReadWrite {
            if let Err(err) = self.flush() {
                warn!("Failed to write shapefile headers: {err}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;
    use featurekit_types::{ClosedContour, Contour, MultiPoint, Polygon, Winding};

    use super::*;

    type MemShapeFile = ShapeFile<Cursor<Vec<u8>>>;

    fn new_file(shape_type: ShapeFileType) -> MemShapeFile {
        ShapeFile::create_with_streams(Cursor::new(vec![]), Cursor::new(vec![]), shape_type)
            .unwrap()
    }

    fn point(x: f64, y: f64) -> Geom<Point2d> {
        Geom::Point(Point2d::new(x, y))
    }

    fn square_wkb() -> Vec<u8> {
        let ring = ClosedContour::from_ring(vec![
            Point2d::new(0.0, 0.0),
            Point2d::new(10.0, 0.0),
            Point2d::new(10.0, 10.0),
            Point2d::new(0.0, 10.0),
            Point2d::new(0.0, 0.0),
        ]);
        wkb::encode(&Geom::Polygon(Polygon::from(ring)))
    }

    #[test]
    fn byte_order_of_written_file() {
        let mut file = new_file(ShapeFileType::Point);
        assert_eq!(file.add_shape(&point(1.0, 2.0)).unwrap(), 1);
        let (shp, shx) = file.into_streams().unwrap();
        let shp = shp.into_inner();
        let shx = shx.into_inner();

        assert_eq!(shp.len(), 128);
        assert_eq!(&shp[0..4], &[0x00, 0x00, 0x27, 0x0A]);
        assert_eq!(&shp[24..28], &[0x00, 0x00, 0x00, 0x40]);
        assert_eq!(&shp[28..32], &[0xE8, 0x03, 0x00, 0x00]);
        assert_eq!(&shp[32..36], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&shp[36..44], &1.0f64.to_le_bytes());
        // record number and content length
        assert_eq!(&shp[100..108], &[0, 0, 0, 1, 0, 0, 0, 10]);
        assert_eq!(&shp[108..112], &[0x01, 0x00, 0x00, 0x00]);
        assert_eq!(&shp[112..120], &1.0f64.to_le_bytes());
        assert_eq!(&shp[120..128], &2.0f64.to_le_bytes());

        assert_eq!(shx.len(), 108);
        assert_eq!(&shx[24..28], &[0x00, 0x00, 0x00, 0x36]);
        assert_eq!(&shx[100..108], &[0, 0, 0, 50, 0, 0, 0, 10]);
    }

    #[test]
    fn square_polygon_scenario() {
        let mut file = new_file(ShapeFileType::Polygon);
        let id = file.add_record(&square_wkb()).unwrap();
        assert_eq!(id, 1);

        let bytes = file.read_record(1).unwrap().unwrap();
        // one ring of 5 vertices
        assert_eq!(&bytes[5..9], &1u32.to_le_bytes());
        assert_eq!(&bytes[9..13], &5u32.to_le_bytes());

        let Geom::Polygon(polygon) = wkb::decode(&bytes).unwrap() else {
            panic!("expected polygon");
        };
        assert!(polygon.inner_contours.is_empty());
        assert_eq!(polygon.outer_contour.winding(), Winding::Clockwise);
        assert_eq!(
            polygon.outer_contour.points,
            vec![
                Point2d::new(0.0, 10.0),
                Point2d::new(10.0, 10.0),
                Point2d::new(10.0, 0.0),
                Point2d::new(0.0, 0.0),
            ]
        );

        assert_eq!(
            file.get_bounding_box_by_id(1).unwrap(),
            Some(BoundingBox::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(
            file.header().bounding_box,
            BoundingBox::new(0.0, 0.0, 10.0, 10.0)
        );
    }

    #[test]
    fn index_matches_written_records() {
        let mut file = new_file(ShapeFileType::MultiPoint);
        let geoms: Vec<Geom<Point2d>> = (1..5)
            .map(|n| {
                Geom::MultiPoint(MultiPoint(
                    (0..n).map(|i| Point2d::new(i as f64, n as f64)).collect(),
                ))
            })
            .collect();

        let mut expected_offset = HEADER_SIZE;
        for geom in &geoms {
            let id = file.add_shape(geom).unwrap();
            let content_len = file.index.get_record_content_length(id).unwrap() as u64;
            assert_eq!(file.index.get_record_offset(id).unwrap(), expected_offset);
            assert_eq!(content_len, 40 + 16 * id as u64);
            expected_offset += RECORD_HEADER_SIZE + content_len;
        }

        assert_eq!(file.shp_len, expected_offset);
        for (i, geom) in geoms.iter().enumerate() {
            assert_eq!(file.read_shape(i as u32 + 1).unwrap().as_ref(), Some(geom));
        }
    }

    #[test]
    fn delete_keeps_ids() {
        let mut file = new_file(ShapeFileType::Point);
        for i in 0..3 {
            file.add_shape(&point(i as f64, 0.0)).unwrap();
        }

        let offset = file.index.get_record_offset(2).unwrap();
        file.delete_record(2).unwrap();

        assert_eq!(file.record_count(), 3);
        assert_eq!(file.read_shape(2).unwrap(), None);
        assert_eq!(file.get_bounding_box_by_id(2).unwrap(), None);
        assert_eq!(file.index.get_record_offset(2).unwrap(), offset);
        assert_eq!(file.index.get_record_content_length(2).unwrap(), 0);
        assert_eq!(file.read_shape(3).unwrap(), Some(point(2.0, 0.0)));
        assert_matches!(file.read_shape(4), Err(ShpError::RecordNotFound(4)));
    }

    /// Content length stored in the `.shp` record header of the record.
    fn shp_content_length(file: &mut MemShapeFile, id: u32) -> u32 {
        let offset = file.index.get_record_offset(id).unwrap();
        let shp = file.shp_mut().unwrap();
        shp.seek(SeekFrom::Start(offset + 4)).unwrap();
        read_i32(shp, Endian::Big).unwrap() as u32 * 2
    }

    fn line(points: &[(f64, f64)]) -> Geom<Point2d> {
        Contour::open(points.iter().map(|&(x, y)| Point2d::new(x, y)).collect()).into()
    }

    #[test]
    fn update_in_place_and_relocated() {
        let mut file = new_file(ShapeFileType::Polyline);
        let long = line(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]);
        let moved = line(&[(5.0, 5.0), (6.0, 6.0), (7.0, 5.0)]);
        let short = line(&[(5.0, 5.0), (6.0, 6.0)]);

        file.add_shape(&long).unwrap();
        file.add_shape(&long).unwrap();
        let len_before = file.shp_len;

        // same size, written in place
        file.update_shape(1, &moved).unwrap();
        assert_eq!(file.shp_len, len_before);
        assert_eq!(file.index.get_record_offset(1).unwrap(), HEADER_SIZE);
        assert_eq!(file.read_shape(1).unwrap(), Some(moved));

        // smaller, moved to the end
        file.update_shape(1, &short).unwrap();
        assert_eq!(file.index.get_record_offset(1).unwrap(), len_before);
        assert_eq!(file.read_shape(1).unwrap(), Some(short));

        let longer = line(&(0..10).map(|i| (i as f64, 0.0)).collect::<Vec<_>>());
        file.update_shape(2, &longer).unwrap();
        assert_eq!(file.read_shape(2).unwrap(), Some(longer));
        assert!(file.validate_all().is_empty());
    }

    #[test]
    fn record_header_matches_index_after_update() {
        let mut file = new_file(ShapeFileType::Polyline);
        let five = line(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (3.0, 0.0), (4.0, 0.0)]);
        file.add_shape(&five).unwrap();
        file.add_shape(&five).unwrap();

        file.update_shape(1, &line(&[(0.0, 0.0), (1.0, 1.0)])).unwrap();
        file.update_shape(2, &five).unwrap();

        for id in 1..=2 {
            assert_eq!(
                shp_content_length(&mut file, id),
                file.index.get_record_content_length(id).unwrap()
            );
        }

        // the index rebuilt from the record headers points to the current records
        let (mut shp, _) = file.into_streams().unwrap();
        let mut index = ShapeFileIndex::rebuild_from(&mut shp, Cursor::new(vec![])).unwrap();
        let shx = index.close().unwrap();
        let mut file = ShapeFile::from_streams(shp, shx, FileAccess::Read).unwrap();
        assert_eq!(file.read_shape(1).unwrap(), Some(line(&[(0.0, 0.0), (1.0, 1.0)])));
        assert_eq!(file.read_shape(2).unwrap(), Some(five));
    }

    #[test]
    fn points_at_origin_extend_header_box() {
        let mut file = new_file(ShapeFileType::Point);
        file.add_shape(&point(5.0, 5.0)).unwrap();
        file.add_shape(&point(0.0, 0.0)).unwrap();
        assert_eq!(file.header().bounding_box, BoundingBox::new(0.0, 0.0, 5.0, 5.0));

        let mut file = new_file(ShapeFileType::Point);
        file.add_shape(&point(0.0, 0.0)).unwrap();
        file.add_shape(&point(5.0, 5.0)).unwrap();
        assert_eq!(file.header().bounding_box, BoundingBox::new(0.0, 0.0, 5.0, 5.0));

        // reopened file with a single record at the origin
        let mut file = new_file(ShapeFileType::Point);
        file.add_shape(&point(0.0, 0.0)).unwrap();
        let (shp, shx) = file.into_streams().unwrap();
        let mut file = ShapeFile::from_streams(shp, shx, FileAccess::ReadWrite).unwrap();
        file.add_shape(&point(-1.0, 2.0)).unwrap();
        assert_eq!(file.header().bounding_box, BoundingBox::new(-1.0, 0.0, 0.0, 2.0));
    }

    #[test]
    fn read_only_file() {
        let mut file = new_file(ShapeFileType::Point);
        file.add_shape(&point(1.0, 1.0)).unwrap();
        let (shp, shx) = file.into_streams().unwrap();

        let mut file = ShapeFile::from_streams(shp, shx, FileAccess::Read).unwrap();
        assert_eq!(file.record_count(), 1);
        assert_eq!(file.read_shape(1).unwrap(), Some(point(1.0, 1.0)));
        assert_matches!(file.add_shape(&point(0.0, 0.0)), Err(ShpError::ReadOnly));
        assert_matches!(file.delete_record(1), Err(ShpError::ReadOnly));

        file.close().unwrap();
        file.close().unwrap();
        assert!(!file.is_open());
        assert_matches!(file.read_shape(1), Err(ShpError::NotOpen));
    }

    #[test]
    fn geometry_must_match_file_type() {
        let mut file = new_file(ShapeFileType::Point);
        assert_matches!(
            file.add_record(&square_wkb()),
            Err(ShpError::GeometryMismatch {
                shape_type: ShapeFileType::Point,
                geometry: "Polygon"
            })
        );
        assert_matches!(file.add_record(&[1, 2, 3]), Err(ShpError::Wkb(_)));
        assert_eq!(file.record_count(), 0);
    }

    #[test]
    fn check_record_reports_mismatch() {
        let mut file = new_file(ShapeFileType::Point);
        file.add_shape(&point(1.0, 1.0)).unwrap();
        file.add_shape(&point(2.0, 2.0)).unwrap();

        // Turn the second record into a polyline type code.
        let offset = file.index.get_record_offset(2).unwrap();
        let shp = file.shp_mut().unwrap();
        shp.seek(SeekFrom::Start(offset + RECORD_HEADER_SIZE))
            .unwrap();
        write_i32(shp, 3, Endian::Little).unwrap();

        assert_eq!(file.check_record_is_valid(1), None);
        let message = file.check_record_is_valid(2).unwrap();
        assert!(message.contains("Polyline"), "{message}");
        assert_eq!(file.validate_all().len(), 1);
        assert_eq!(
            file.record_shape_type(2).unwrap(),
            Some(ShapeFileType::Polyline)
        );
        assert!(file.check_record_is_valid(3).is_some());
    }

    #[test]
    fn custom_loader() {
        let mut file = new_file(ShapeFileType::Point);
        file.add_shape(&point(3.0, 4.0)).unwrap();
        let (shp, shx) = file.into_streams().unwrap();
        let mut streams = vec![shx, shp];

        let mut file = ShapeFile::open_with(
            Path::new("memory.shp"),
            FileAccess::Read,
            |_path, _access| streams.pop().ok_or(std::io::ErrorKind::NotFound.into()),
        )
        .unwrap();
        assert_eq!(file.read_shape(1).unwrap(), Some(point(3.0, 4.0)));

        let result = MemShapeFile::open_with(Path::new("missing.shp"), FileAccess::Read, |_, _| {
            Err(std::io::ErrorKind::NotFound.into())
        });
        assert_matches!(
            result,
            Err(ShpError::FileNotFound(path)) if path == Path::new("missing.shp")
        );
    }

    #[test]
    fn z_files_are_not_created() {
        assert_matches!(
            ShapeFile::create_with_streams(
                Cursor::new(vec![]),
                Cursor::new(vec![]),
                ShapeFileType::PolygonZ
            ),
            Err(ShpError::UnsupportedWrite(ShapeFileType::PolygonZ))
        );
    }
}
