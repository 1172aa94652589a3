//! Dense grid of cells and its ESRI ASCII grid representation.

use std::io::{BufRead, Write};

use featurekit_types::cartesian::Rect;

use crate::cell::GridCell;
use crate::definition::GridDefinition;
use crate::error::GridError;

const DEFAULT_NO_DATA: f64 = -9999.0;

/// Dense grid of cells stored row by row. Row 0 is the top (northern-most) row.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMatrix {
    rows: usize,
    columns: usize,
    cell_size: f64,
    no_data_value: f64,
    cells: Vec<GridCell>,
}

impl GridMatrix {
    /// Creates a grid with the layout of the definition and the given cell values in row-major order.
    pub fn from_values(definition: &GridDefinition, values: Vec<f64>) -> Result<Self, GridError> {
        let rows = definition.rows();
        let columns = definition.columns();
        if values.len() != rows * columns {
            return Err(GridError::InvalidDefinition(format!(
                "expected {} values for a {rows}x{columns} grid, got {}",
                rows * columns,
                values.len()
            )));
        }

        let cells = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let center = definition.cell_center(index / columns, index % columns);
                GridCell::new(center.x, center.y, value)
            })
            .collect();

        Ok(Self {
            rows,
            columns,
            cell_size: definition.cell_size(),
            no_data_value: definition.no_data_value(),
            cells,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.columns
    }

    /// Cell size.
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Value of cells without data.
    pub fn no_data_value(&self) -> f64 {
        self.no_data_value
    }

    /// Cell at the given position.
    pub fn get(&self, row: usize, column: usize) -> Option<&GridCell> {
        if row >= self.rows || column >= self.columns {
            return None;
        }

        self.cells.get(row * self.columns + column)
    }

    /// Returns true if the cell value is the no-data value or is not a finite number.
    pub fn is_no_data(&self, value: f64) -> bool {
        value == self.no_data_value || !value.is_finite()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Iterates over rows of cells, from top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(self.columns.max(1))
    }

    /// Area covered by the cells.
    pub fn extent(&self) -> Option<Rect> {
        let first = self.cells.first()?;
        let last = self.cells.last()?;
        let half = self.cell_size / 2.0;

        Some(Rect::new(
            first.center_x - half,
            last.center_y - half,
            last.center_x + half,
            first.center_y + half,
        ))
    }

    /// Writes the grid in the ESRI ASCII grid format.
    pub fn write_ascii(&self, writer: &mut impl Write) -> Result<(), GridError> {
        let Some(extent) = self.extent() else {
            return Err(GridError::InvalidDefinition("grid is empty".into()));
        };

        writeln!(writer, "ncols {}", self.columns)?;
        writeln!(writer, "nrows {}", self.rows)?;
        writeln!(writer, "xllcorner {}", extent.x_min())?;
        writeln!(writer, "yllcorner {}", extent.y_min())?;
        writeln!(writer, "cellsize {}", self.cell_size)?;
        writeln!(writer, "NODATA_value {}", self.no_data_value)?;

        for row in self.iter_rows() {
            let line = row
                .iter()
                .map(|cell| cell.value.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(writer, "{line}")?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Reads a grid in the ESRI ASCII grid format.
    ///
    /// Both `xllcorner`/`yllcorner` and `xllcenter`/`yllcenter` headers are supported. Header keys are case
    /// insensitive. If `NODATA_value` is missing, `-9999` is used.
    pub fn read_ascii(reader: impl BufRead) -> Result<Self, GridError> {
        let mut header = AsciiHeader::default();
        let mut values = Vec::new();

        for line in reader.lines() {
            let line = line?;
            let mut tokens = line.split_whitespace().peekable();
            let Some(first) = tokens.peek() else {
                continue;
            };

            if values.is_empty() && first.starts_with(|c: char| c.is_ascii_alphabetic()) {
                let key = first.to_ascii_lowercase();
                tokens.next();
                let value = tokens
                    .next()
                    .ok_or_else(|| GridError::Parse(format!("missing value of {key}")))?;
                header.set(&key, value)?;
                continue;
            }

            for token in tokens {
                values.push(parse_number(token)?);
            }
        }

        let definition = header.into_definition()?;
        Self::from_values(&definition, values).map_err(|err| GridError::Parse(err.to_string()))
    }
}

#[derive(Debug, Default)]
struct AsciiHeader {
    columns: Option<usize>,
    rows: Option<usize>,
    x: Option<f64>,
    y: Option<f64>,
    is_center: bool,
    cell_size: Option<f64>,
    no_data: Option<f64>,
}

impl AsciiHeader {
    fn set(&mut self, key: &str, value: &str) -> Result<(), GridError> {
        match key {
            "ncols" => self.columns = Some(parse_count(value)?),
            "nrows" => self.rows = Some(parse_count(value)?),
            "xllcorner" => self.x = Some(parse_number(value)?),
            "yllcorner" => self.y = Some(parse_number(value)?),
            "xllcenter" => {
                self.x = Some(parse_number(value)?);
                self.is_center = true;
            }
            "yllcenter" => {
                self.y = Some(parse_number(value)?);
                self.is_center = true;
            }
            "cellsize" => self.cell_size = Some(parse_number(value)?),
            "nodata_value" => self.no_data = Some(parse_number(value)?),
            other => return Err(GridError::Parse(format!("unknown header key {other}"))),
        }

        Ok(())
    }

    fn into_definition(self) -> Result<GridDefinition, GridError> {
        let missing = |name: &str| GridError::Parse(format!("missing {name} header"));
        let columns = self.columns.ok_or_else(|| missing("ncols"))?;
        let rows = self.rows.ok_or_else(|| missing("nrows"))?;
        let mut x_min = self.x.ok_or_else(|| missing("xllcorner"))?;
        let mut y_min = self.y.ok_or_else(|| missing("yllcorner"))?;
        let cell_size = self.cell_size.ok_or_else(|| missing("cellsize"))?;

        if self.is_center {
            x_min -= cell_size / 2.0;
            y_min -= cell_size / 2.0;
        }

        let extent = Rect::new(
            x_min,
            y_min,
            x_min + columns as f64 * cell_size,
            y_min + rows as f64 * cell_size,
        );

        GridDefinition::new(extent, cell_size, self.no_data.unwrap_or(DEFAULT_NO_DATA))
            .map_err(|err| GridError::Parse(err.to_string()))
    }
}

fn parse_number(token: &str) -> Result<f64, GridError> {
    token
        .parse()
        .map_err(|_| GridError::Parse(format!("invalid number {token}")))
}

fn parse_count(token: &str) -> Result<usize, GridError> {
    token
        .parse()
        .map_err(|_| GridError::Parse(format!("invalid count {token}")))
}
