use std::io::{Read, Seek, SeekFrom, Write};

use featurekit_types::cartesian::Rect;

use crate::endian::{read_f64, write_f64, Endian};

/// Offset of the bounding box in the file header.
const HEADER_BOX_OFFSET: u64 = 36;

/// Bounding box as stored in shapefile headers and records.
///
/// A box with all four values equal to zero is the "empty" box of a newly created file. [`BoundingBox::merge`]
/// replaces it instead of extending it to include the origin, [`BoundingBox::extend`] does not.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct BoundingBox {
    /// Minimum X.
    pub min_x: f64,
    /// Maximum X.
    pub max_x: f64,
    /// Minimum Y.
    pub min_y: f64,
    /// Maximum Y.
    pub max_y: f64,
}

impl BoundingBox {
    /// Creates a new bounding box.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    /// Returns true for the all-zero box.
    pub fn is_empty(&self) -> bool {
        self.min_x == 0.0 && self.max_x == 0.0 && self.min_y == 0.0 && self.max_y == 0.0
    }

    /// Expands the box to cover `other`. An empty box is replaced by `other`.
    pub fn merge(&mut self, other: &BoundingBox) {
        if self.is_empty() {
            *self = *other;
            return;
        }

        self.extend(other);
    }

    /// Expands the box to cover `other`, treating all-zero boxes as regular boxes at the origin.
    pub fn extend(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Reads the bounding box of the file header. The stream position is moved to the end of the box.
    pub fn read_header_box<R: Read + Seek>(stream: &mut R) -> std::io::Result<Self> {
        stream.seek(SeekFrom::Start(HEADER_BOX_OFFSET))?;
        Self::read_from(stream)
    }

    /// Reads 4 little-endian doubles in order min X, min Y, max X, max Y.
    pub fn read_from(reader: &mut impl Read) -> std::io::Result<Self> {
        let min_x = read_f64(reader, Endian::Little)?;
        let min_y = read_f64(reader, Endian::Little)?;
        let max_x = read_f64(reader, Endian::Little)?;
        let max_y = read_f64(reader, Endian::Little)?;

        Ok(Self::new(min_x, min_y, max_x, max_y))
    }

    /// Writes the box. The file header box is followed by Z and M ranges, which are written as zeros.
    pub fn write_to(&self, writer: &mut impl Write, is_header_box: bool) -> std::io::Result<()> {
        write_f64(writer, self.min_x, Endian::Little)?;
        write_f64(writer, self.min_y, Endian::Little)?;
        write_f64(writer, self.max_x, Endian::Little)?;
        write_f64(writer, self.max_y, Endian::Little)?;

        if is_header_box {
            for _ in 0..4 {
                write_f64(writer, 0.0, Endian::Little)?;
            }
        }

        Ok(())
    }

    /// Converts the box into a rectangle.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

impl From<Rect> for BoundingBox {
    fn from(value: Rect) -> Self {
        Self::new(value.x_min, value.y_min, value.x_max, value.y_max)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn boxes() -> Vec<BoundingBox> {
        vec![
            BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            BoundingBox::new(-5.0, 2.0, -1.0, 3.0),
            BoundingBox::new(3.0, -7.0, 4.0, 10.0),
        ]
    }

    #[test]
    fn merge_into_empty_replaces() {
        let mut bbox = BoundingBox::default();
        let other = BoundingBox::new(5.0, 6.0, 7.0, 8.0);
        bbox.merge(&other);
        assert_eq!(bbox, other);

        // a box at the origin is a real extent when merged into a non-empty box
        bbox.merge(&BoundingBox::default());
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 7.0, 8.0));
    }

    #[test]
    fn extend_keeps_origin() {
        let mut bbox = BoundingBox::default();
        bbox.extend(&BoundingBox::new(5.0, 5.0, 5.0, 5.0));
        assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 5.0, 5.0));
    }

    #[test]
    fn merge_is_order_independent() {
        let expected = BoundingBox::new(-5.0, -7.0, 4.0, 10.0);
        let orders = [[0, 1, 2], [2, 1, 0], [1, 0, 2], [2, 0, 1]];
        for order in orders {
            let mut bbox = BoundingBox::default();
            for i in order {
                bbox.merge(&boxes()[i]);
            }
            assert_eq!(bbox, expected);
        }

        // (a + b) + c == a + (b + c)
        let b = boxes();
        let mut left = b[0];
        left.merge(&b[1]);
        left.merge(&b[2]);
        let mut right = b[1];
        right.merge(&b[2]);
        let mut a = b[0];
        a.merge(&right);
        assert_eq!(left, a);
    }

    #[test]
    fn write_and_read() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let mut buf = vec![];
        bbox.write_to(&mut buf, false).unwrap();
        assert_eq!(buf.len(), 32);
        assert_eq!(&buf[8..16], &2.0f64.to_le_bytes());
        assert_eq!(BoundingBox::read_from(&mut Cursor::new(&buf)).unwrap(), bbox);

        let mut buf = vec![];
        bbox.write_to(&mut buf, true).unwrap();
        assert_eq!(buf.len(), 64);
        assert!(buf[32..].iter().all(|b| *b == 0));
    }
}
