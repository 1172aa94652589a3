//! Reader and writer of `.shx` index files.
//!
//! An index file consists of the same 100-byte header as the `.shp` file, followed by one 8-byte entry per record:
//! the offset of the record in the `.shp` file and the length of its content, both as big-endian numbers of 16-bit
//! words.
//!
//! Deleting a record zeroes its content length but keeps the entry, so record ids stay stable. Space is never
//! reclaimed.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use log::{debug, trace, warn};

use crate::endian::{read_i32, write_i32, Endian};
use crate::error::ShpError;
use crate::header::{ShapeFileHeader, HEADER_SIZE};
use crate::shape_type::ShapeFileType;
use crate::{load_stream, open_file, FileAccess};

const ENTRY_SIZE: u64 = 8;
const CACHE_SIZE: u64 = 512;

/// Index of the records of a shapefile.
#[derive(Debug)]
pub struct ShapeFileIndex<S = File> {
    stream: Option<S>,
    header: ShapeFileHeader,
    access: FileAccess,
    stream_len: u64,
    cache: IndexCache,
}

/// Window of index bytes read from the stream in one go.
#[derive(Debug, Default)]
struct IndexCache {
    start: u64,
    data: Vec<u8>,
}

impl IndexCache {
    fn contains(&self, position: u64, len: u64) -> bool {
        position >= self.start && position + len <= self.start + self.data.len() as u64
    }

    fn overlaps(&self, position: u64, len: u64) -> bool {
        position < self.start + self.data.len() as u64 && position + len > self.start
    }

    fn read_i32(&self, position: u64) -> i32 {
        let offset = (position - self.start) as usize;
        BigEndian::read_i32(&self.data[offset..offset + 4])
    }

    fn clear(&mut self) {
        self.data.clear();
    }
}

impl ShapeFileIndex<File> {
    /// Opens an index file on disk.
    pub fn open(path: impl AsRef<Path>, access: FileAccess) -> Result<Self, ShpError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ShpError::FileNotFound(path.into()));
        }

        Self::open_with(path, access, open_file)
    }

    /// Regenerates the `.shx` file of the given `.shp` file by scanning the record headers of the `.shp` file.
    ///
    /// An existing index file is overwritten. Returns the new index opened for reading and writing.
    pub fn rebuild(shp_path: impl AsRef<Path>) -> Result<Self, ShpError> {
        let shp_path = shp_path.as_ref();
        if !shp_path.is_file() {
            return Err(ShpError::FileNotFound(shp_path.into()));
        }

        let shx_path = shp_path.with_extension("shx");
        debug!("Rebuilding index {shx_path:?}");

        let mut shp = File::open(shp_path)?;
        let shx = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&shx_path)?;

        Self::rebuild_from(&mut shp, shx)
    }
}

impl<S: Read + Write + Seek> ShapeFileIndex<S> {
    /// Opens the index using a custom stream loader.
    ///
    /// The loader is called with the path and access mode and must return the stream of the index. A loader failing
    /// with [`std::io::ErrorKind::NotFound`] results in [`ShpError::FileNotFound`].
    pub fn open_with<F>(path: &Path, access: FileAccess, loader: F) -> Result<Self, ShpError>
    where
        F: FnOnce(&Path, FileAccess) -> std::io::Result<S>,
    {
        let stream = load_stream(path, access, loader)?;
        Self::from_stream(stream, access)
    }

    /// Reads the header of the index from an open stream.
    pub fn from_stream(mut stream: S, access: FileAccess) -> Result<Self, ShpError> {
        let header = ShapeFileHeader::read_from(&mut stream)?;
        let stream_len = stream.seek(SeekFrom::End(0))?;

        Ok(Self {
            stream: Some(stream),
            header,
            access,
            stream_len,
            cache: IndexCache::default(),
        })
    }

    /// Writes the header of an empty index into the stream. The stream is expected to be empty.
    pub fn create_in(mut stream: S, shape_type: ShapeFileType) -> Result<Self, ShpError> {
        let header = ShapeFileHeader::new(shape_type);
        header.write_to(&mut stream)?;

        Ok(Self {
            stream: Some(stream),
            header,
            access: FileAccess::ReadWrite,
            stream_len: HEADER_SIZE,
            cache: IndexCache::default(),
        })
    }

    /// Builds a new index in `shx` from the records of the `shp` stream.
    ///
    /// Records are identified by the record numbers in their headers. If the same number appears several times, the
    /// last record wins. Numbers that do not appear at all get deleted entries.
    pub fn rebuild_from<R: Read + Seek>(shp: &mut R, shx: S) -> Result<Self, ShpError> {
        let header = ShapeFileHeader::read_from(shp)?;
        let shp_len = shp.seek(SeekFrom::End(0))?;
        let max_records = shp_len.saturating_sub(HEADER_SIZE) / ENTRY_SIZE;

        let mut entries: Vec<(u64, u32)> = vec![];
        let mut position = HEADER_SIZE;
        while position + ENTRY_SIZE <= shp_len {
            shp.seek(SeekFrom::Start(position))?;
            let record_number = read_i32(shp, Endian::Big)?;
            let content_words = read_i32(shp, Endian::Big)?;
            let content_len = content_words as u64 * 2;

            if content_words < 0 || position + ENTRY_SIZE + content_len > shp_len {
                warn!("Record at offset {position} is truncated, skipping the rest of the file");
                break;
            }

            if record_number <= 0 || record_number as u64 > max_records {
                warn!("Skipping record with invalid number {record_number} at offset {position}");
            } else {
                let idx = record_number as usize - 1;
                if entries.len() <= idx {
                    entries.resize(idx + 1, (0, 0));
                }
                entries[idx] = (position, content_len as u32);
            }

            position += ENTRY_SIZE + content_len;
        }

        let mut index = Self::create_in(shx, header.shape_type)?;
        index.header.bounding_box = header.bounding_box;
        for (offset, content_length) in &entries {
            index.add_record(*offset, *content_length)?;
        }
        index.flush()?;

        debug!("Index rebuilt with {} records", entries.len());
        Ok(index)
    }

    /// Header of the index.
    pub fn header(&self) -> &ShapeFileHeader {
        &self.header
    }

    /// Mutable header of the index. Changes are written on [`ShapeFileIndex::flush`].
    pub fn header_mut(&mut self) -> &mut ShapeFileHeader {
        &mut self.header
    }

    /// Number of entries in the index, including deleted ones.
    pub fn record_count(&self) -> u32 {
        (self.stream_len.saturating_sub(HEADER_SIZE) / ENTRY_SIZE) as u32
    }

    /// Returns true if the index stream has not been closed.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Offset of the record in the `.shp` file in bytes.
    pub fn get_record_offset(&mut self, id: u32) -> Result<u64, ShpError> {
        let position = self.entry_position(id)?;
        let words = self.read_cached(position)?;
        if words < 0 {
            return Err(ShpError::InvalidData(format!(
                "negative offset of record {id}"
            )));
        }

        Ok(words as u64 * 2)
    }

    /// Length of the record content in bytes (without the 8-byte record header). Deleted records have length 0.
    pub fn get_record_content_length(&mut self, id: u32) -> Result<u32, ShpError> {
        let position = self.entry_position(id)?;
        let words = self.read_cached(position + 4)?;
        if words < 0 {
            return Err(ShpError::InvalidData(format!(
                "negative content length of record {id}"
            )));
        }

        Ok(words as u32 * 2)
    }

    /// Appends a new entry. Returns the id of the new record.
    pub fn add_record(&mut self, offset: u64, content_length: u32) -> Result<u32, ShpError> {
        let id = self.record_count() + 1;
        let position = Self::position_of(id);
        self.write_entry(position, offset, content_length)?;

        self.stream_len = self.stream_len.max(position + ENTRY_SIZE);
        self.header.set_file_length_bytes(self.stream_len);

        Ok(id)
    }

    /// Replaces an existing entry.
    pub fn update_record(
        &mut self,
        id: u32,
        offset: u64,
        content_length: u32,
    ) -> Result<(), ShpError> {
        let position = self.entry_position(id)?;
        self.write_entry(position, offset, content_length)
    }

    /// Marks the record as deleted by setting its content length to zero. The offset is kept.
    pub fn delete_record(&mut self, id: u32) -> Result<(), ShpError> {
        let position = self.entry_position(id)? + 4;
        self.check_writable()?;
        self.cache_invalidate(position, 4);

        let stream = self.stream_mut()?;
        stream.seek(SeekFrom::Start(position))?;
        write_i32(stream, 0, Endian::Big)?;

        Ok(())
    }

    /// Writes the header and flushes the stream.
    pub fn flush(&mut self) -> Result<(), ShpError> {
        self.check_writable()?;
        self.header.set_file_length_bytes(self.stream_len);

        let header = self.header.clone();
        let stream = self.stream_mut()?;
        header.write_to(stream)?;
        stream.flush()?;

        Ok(())
    }

    /// Releases the stream without flushing it.
    pub fn close(&mut self) -> Option<S> {
        self.cache.clear();
        self.stream.take()
    }

    fn position_of(id: u32) -> u64 {
        HEADER_SIZE + (id as u64 - 1) * ENTRY_SIZE
    }

    fn entry_position(&self, id: u32) -> Result<u64, ShpError> {
        if self.stream.is_none() {
            return Err(ShpError::NotOpen);
        }

        if id == 0 || id > self.record_count() {
            return Err(ShpError::RecordNotFound(id));
        }

        Ok(Self::position_of(id))
    }

    fn stream_mut(&mut self) -> Result<&mut S, ShpError> {
        self.stream.as_mut().ok_or(ShpError::NotOpen)
    }

    fn check_writable(&self) -> Result<(), ShpError> {
        match self.access {
            FileAccess::ReadWrite => Ok(()),
            FileAccess::Read => Err(ShpError::ReadOnly),
        }
    }

    fn cache_invalidate(&mut self, position: u64, len: u64) {
        if self.cache.overlaps(position, len) {
            self.cache.clear();
        }
    }

    fn read_cached(&mut self, position: u64) -> Result<i32, ShpError> {
        if !self.cache.contains(position, 4) {
            let stream = self.stream_mut()?;
            stream.seek(SeekFrom::Start(position))?;

            let mut data = Vec::with_capacity(CACHE_SIZE as usize);
            stream.take(CACHE_SIZE).read_to_end(&mut data)?;
            trace!("Index cache reloaded at {position}, {} bytes", data.len());

            self.cache = IndexCache {
                start: position,
                data,
            };

            if !self.cache.contains(position, 4) {
                return Err(ShpError::InvalidData(format!(
                    "index entry at {position} is truncated"
                )));
            }
        }

        Ok(self.cache.read_i32(position))
    }

    fn write_entry(
        &mut self,
        position: u64,
        offset: u64,
        content_length: u32,
    ) -> Result<(), ShpError> {
        self.check_writable()?;
        let offset_words = to_words(offset)?;
        let length_words = to_words(content_length as u64)?;
        self.cache_invalidate(position, ENTRY_SIZE);

        let stream = self.stream_mut()?;
        stream.seek(SeekFrom::Start(position))?;
        write_i32(stream, offset_words, Endian::Big)?;
        write_i32(stream, length_words, Endian::Big)?;

        Ok(())
    }
}

/// Converts a byte count into the number of 16-bit words used by the format.
pub(crate) fn to_words(bytes: u64) -> Result<i32, ShpError> {
    i32::try_from(bytes / 2).map_err(|_| {
        ShpError::InvalidData(format!("{bytes} bytes exceed the shapefile size limit"))
    })
}
