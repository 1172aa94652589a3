//! Byte order aware primitives.
//!
//! Shapefiles mix byte orders: file code, file length, record numbers and content lengths are big-endian, while
//! version, shape types, counts and coordinates are little-endian.

use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

/// Byte order of a field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
}

/// Reads a 32-bit signed integer.
pub fn read_i32(reader: &mut impl Read, endian: Endian) -> std::io::Result<i32> {
    match endian {
        Endian::Big => reader.read_i32::<BigEndian>(),
        Endian::Little => reader.read_i32::<LittleEndian>(),
    }
}

/// Writes a 32-bit signed integer.
pub fn write_i32(writer: &mut impl Write, value: i32, endian: Endian) -> std::io::Result<()> {
    match endian {
        Endian::Big => writer.write_i32::<BigEndian>(value),
        Endian::Little => writer.write_i32::<LittleEndian>(value),
    }
}

/// Reads a double.
pub fn read_f64(reader: &mut impl Read, endian: Endian) -> std::io::Result<f64> {
    match endian {
        Endian::Big => reader.read_f64::<BigEndian>(),
        Endian::Little => reader.read_f64::<LittleEndian>(),
    }
}

/// Writes a double.
pub fn write_f64(writer: &mut impl Write, value: f64, endian: Endian) -> std::io::Result<()> {
    match endian {
        Endian::Big => writer.write_f64::<BigEndian>(value),
        Endian::Little => writer.write_f64::<LittleEndian>(value),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn int_byte_order() {
        let mut buf = vec![];
        write_i32(&mut buf, 9994, Endian::Big).unwrap();
        write_i32(&mut buf, 1000, Endian::Little).unwrap();
        assert_eq!(buf, [0x00, 0x00, 0x27, 0x0A, 0xE8, 0x03, 0x00, 0x00]);

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_i32(&mut cursor, Endian::Big).unwrap(), 9994);
        assert_eq!(read_i32(&mut cursor, Endian::Little).unwrap(), 1000);
        assert!(read_i32(&mut cursor, Endian::Little).is_err());
    }

    #[test]
    fn double_byte_order() {
        let mut buf = vec![];
        write_f64(&mut buf, 1.0, Endian::Little).unwrap();
        write_f64(&mut buf, 1.0, Endian::Big).unwrap();
        assert_eq!(&buf[..8], &[0, 0, 0, 0, 0, 0, 0xF0, 0x3F]);
        assert_eq!(&buf[8..], &[0x3F, 0xF0, 0, 0, 0, 0, 0, 0]);
    }
}
