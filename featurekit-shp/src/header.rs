use std::io::{Read, Seek, SeekFrom, Write};

use crate::bounding_box::BoundingBox;
use crate::endian::{read_i32, write_i32, Endian};
use crate::error::ShpError;
use crate::shape_type::ShapeFileType;

/// Magic number at the start of `.shp` and `.shx` files.
pub const FILE_CODE: i32 = 9994;
/// Format version written into new files.
pub const VERSION: i32 = 1000;
/// Size of the header in bytes.
pub const HEADER_SIZE: u64 = 100;

/// The 100-byte header shared by `.shp` and `.shx` files.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeFileHeader {
    /// Magic number, always [`FILE_CODE`].
    pub file_code: i32,
    /// Length of the whole file in 16-bit words.
    pub file_length: i32,
    /// Format version.
    pub version: i32,
    /// Shape type of all records in the file.
    pub shape_type: ShapeFileType,
    /// Bounding box of all records.
    pub bounding_box: BoundingBox,
}

impl ShapeFileHeader {
    /// Header of an empty file.
    pub fn new(shape_type: ShapeFileType) -> Self {
        Self {
            file_code: FILE_CODE,
            file_length: (HEADER_SIZE / 2) as i32,
            version: VERSION,
            shape_type,
            bounding_box: BoundingBox::default(),
        }
    }

    /// File length in bytes.
    pub fn file_length_bytes(&self) -> u64 {
        self.file_length as u64 * 2
    }

    /// Sets the file length from the length of the stream in bytes.
    pub fn set_file_length_bytes(&mut self, len: u64) {
        self.file_length = (len / 2) as i32;
    }

    /// Reads the header from the start of the stream.
    pub fn read_from<R: Read + Seek>(stream: &mut R) -> Result<Self, ShpError> {
        stream.seek(SeekFrom::Start(0))?;

        let file_code = read_i32(stream, Endian::Big)?;
        if file_code != FILE_CODE {
            return Err(ShpError::InvalidFileCode(file_code));
        }

        // 5 unused integers
        stream.seek(SeekFrom::Start(24))?;
        let file_length = read_i32(stream, Endian::Big)?;
        let version = read_i32(stream, Endian::Little)?;
        if version != VERSION {
            log::warn!("Unexpected shapefile version {version}");
        }

        let shape_type_code = read_i32(stream, Endian::Little)?;
        let shape_type = ShapeFileType::from_code(shape_type_code)
            .ok_or(ShpError::UnknownShapeType(shape_type_code))?;
        let bounding_box = BoundingBox::read_from(stream)?;

        Ok(Self {
            file_code,
            file_length,
            version,
            shape_type,
            bounding_box,
        })
    }

    /// Writes the header at the start of the stream.
    pub fn write_to<W: Write + Seek>(&self, stream: &mut W) -> std::io::Result<()> {
        stream.seek(SeekFrom::Start(0))?;

        write_i32(stream, self.file_code, Endian::Big)?;
        for _ in 0..5 {
            write_i32(stream, 0, Endian::Big)?;
        }
        write_i32(stream, self.file_length, Endian::Big)?;
        write_i32(stream, self.version, Endian::Little)?;
        write_i32(stream, self.shape_type.code(), Endian::Little)?;
        self.bounding_box.write_to(stream, true)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn header_layout() {
        let mut header = ShapeFileHeader::new(ShapeFileType::Polygon);
        header.bounding_box = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        header.set_file_length_bytes(236);

        let mut stream = Cursor::new(vec![]);
        header.write_to(&mut stream).unwrap();
        let bytes = stream.get_ref();

        assert_eq!(bytes.len(), HEADER_SIZE as usize);
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0x27, 0x0A]);
        assert!(bytes[4..24].iter().all(|b| *b == 0));
        assert_eq!(&bytes[24..28], &[0x00, 0x00, 0x00, 0x76]);
        assert_eq!(&bytes[28..32], &[0xE8, 0x03, 0x00, 0x00]);
        assert_eq!(&bytes[32..36], &[0x05, 0x00, 0x00, 0x00]);
        assert_eq!(&bytes[36..44], &1.0f64.to_le_bytes());
        assert_eq!(&bytes[60..68], &4.0f64.to_le_bytes());
        assert!(bytes[68..].iter().all(|b| *b == 0));

        assert_eq!(ShapeFileHeader::read_from(&mut stream).unwrap(), header);
        assert_eq!(
            BoundingBox::read_header_box(&mut stream).unwrap(),
            header.bounding_box
        );
    }

    #[test]
    fn invalid_header() {
        let mut stream = Cursor::new(vec![0u8; 100]);
        assert_matches!(
            ShapeFileHeader::read_from(&mut stream),
            Err(ShpError::InvalidFileCode(0))
        );

        let mut stream = Cursor::new(vec![]);
        let header = ShapeFileHeader::new(ShapeFileType::Point);
        header.write_to(&mut stream).unwrap();
        stream.get_mut()[32] = 2;
        assert_matches!(
            ShapeFileHeader::read_from(&mut stream),
            Err(ShpError::UnknownShapeType(2))
        );

        let mut stream = Cursor::new(vec![0x00, 0x00, 0x27, 0x0A]);
        assert_matches!(
            ShapeFileHeader::read_from(&mut stream),
            Err(ShpError::Io(_))
        );
    }
}
