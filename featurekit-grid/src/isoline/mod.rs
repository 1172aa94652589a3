//! Isoline (contour line) extraction from a [`GridMatrix`].
//!
//! The tracer works on the lattice formed by cell centres. Every 2x2 group of neighbouring nodes forms a window. An
//! isoline enters a window through one of its sides, and the corner values decide which side it leaves through. The
//! tracer then moves on to the window behind that side. Windows with a diagonal corner pattern (saddles) are
//! resolved by recursive subdivision into quadrants.

use featurekit_types::cartesian::Point2d;
use featurekit_types::Contour;
use log::debug;
use rayon::prelude::*;

use crate::cell::GridCell;
use crate::error::GridError;
use crate::matrix::GridMatrix;

mod diagonal;
mod rectangle;
mod side;

use diagonal::{resolve_saddle, SaddleError};
use rectangle::{nudge, CellCase, ValueRectangle};
use side::Side;

/// A single isoline.
#[derive(Debug, Clone, PartialEq)]
pub struct Isoline {
    /// Value the isoline was traced for.
    pub level: f64,
    /// Points of the line. For a closed isoline the last point repeats the first one.
    pub points: Vec<GridCell>,
    /// Whether the isoline is a ring.
    pub is_closed: bool,
}

impl Isoline {
    /// Converts the isoline into a contour. The repeated closing point of a ring is dropped.
    pub fn to_contour(&self) -> Contour<Point2d> {
        let mut points: Vec<Point2d> = self
            .points
            .iter()
            .map(|p| Point2d::new(p.center_x, p.center_y))
            .collect();

        if self.is_closed {
            points.pop();
            Contour::closed(points)
        } else {
            Contour::open(points)
        }
    }
}

/// Extracts isolines from a grid.
///
/// ```
/// use featurekit_grid::{GridDefinition, GridMatrix, IsolineTracer};
/// use featurekit_types::cartesian::Rect;
///
/// let definition = GridDefinition::new(Rect::new(0.0, 0.0, 3.0, 3.0), 1.0, -9999.0).unwrap();
/// let values = vec![0.0, 0.0, 0.0, 0.0, 9.0, 0.0, 0.0, 0.0, 0.0];
/// let grid = GridMatrix::from_values(&definition, values).unwrap();
///
/// let isolines = IsolineTracer::new(&grid).trace_level(3.0).unwrap();
/// assert_eq!(isolines.len(), 1);
/// assert!(isolines[0].is_closed);
/// ```
#[derive(Debug, Clone)]
pub struct IsolineTracer<'a> {
    grid: &'a GridMatrix,
    no_data_value: f64,
}

impl<'a> IsolineTracer<'a> {
    /// Creates a tracer using the no-data value of the grid.
    pub fn new(grid: &'a GridMatrix) -> Self {
        Self {
            grid,
            no_data_value: grid.no_data_value(),
        }
    }

    /// Sets the value of nodes to skip while tracing.
    pub fn with_no_data(mut self, no_data_value: f64) -> Self {
        self.no_data_value = no_data_value;
        self
    }

    /// Extracts all isolines at the given level.
    ///
    /// Lines that reach the border of the grid or a no-data node come first, then closed rings.
    ///
    /// # Errors
    ///
    /// [`GridError::InsufficientDetail`] if a saddle window cannot be resolved by subdivision. This happens when the
    /// saddle point of the bilinear surface through the window corners lies exactly on the level, e.g. corners
    /// `-4, 2, -1, 2` (counter-clockwise from the lower left one) at level `0`. Integer grids hit it more often.
    pub fn trace_level(&self, level: f64) -> Result<Vec<Isoline>, GridError> {
        let isolines = LevelTrace::new(self, level).run()?;
        debug!("Traced {} isolines at level {level}", isolines.len());

        Ok(isolines)
    }

    /// Extracts isolines at every level. Levels are traced in parallel, the result keeps the order of `levels`.
    pub fn trace_levels(&self, levels: &[f64]) -> Result<Vec<Vec<Isoline>>, GridError> {
        levels
            .par_iter()
            .map(|level| self.trace_level(*level))
            .collect()
    }

    fn columns(&self) -> usize {
        self.grid.cols()
    }

    fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Node in lattice coordinates: `i` grows east, `j` grows north.
    fn node(&self, i: usize, j: usize) -> Option<&GridCell> {
        let row = self.rows().checked_sub(j + 1)?;
        self.grid.get(row, i)
    }

    fn is_valid_node(&self, i: usize, j: usize) -> bool {
        self.node(i, j)
            .is_some_and(|n| n.value != self.no_data_value && n.value.is_finite())
    }
}

/// Edge between two neighbouring nodes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Edge {
    /// Between `(i, j)` and `(i + 1, j)`.
    Horizontal(usize, usize),
    /// Between `(i, j)` and `(i, j + 1)`.
    Vertical(usize, usize),
}

impl Edge {
    fn nodes(self) -> [(usize, usize); 2] {
        match self {
            Edge::Horizontal(i, j) => [(i, j), (i + 1, j)],
            Edge::Vertical(i, j) => [(i, j), (i, j + 1)],
        }
    }
}

/// Window with the lower left node `(i, j)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Window {
    i: usize,
    j: usize,
}

impl Window {
    fn edge(self, side: Side) -> Edge {
        let Window { i, j } = self;
        match side {
            Side::Bottom => Edge::Horizontal(i, j),
            Side::Top => Edge::Horizontal(i, j + 1),
            Side::Left => Edge::Vertical(i, j),
            Side::Right => Edge::Vertical(i + 1, j),
        }
    }

    fn neighbour(self, side: Side) -> Option<Window> {
        let Window { i, j } = self;
        match side {
            Side::Bottom => Some(Window { i, j: j.checked_sub(1)? }),
            Side::Top => Some(Window { i, j: j + 1 }),
            Side::Left => Some(Window { i: i.checked_sub(1)?, j }),
            Side::Right => Some(Window { i: i + 1, j }),
        }
    }
}

/// State of tracing one level: visited edge marks.
struct LevelTrace<'t, 'a> {
    tracer: &'t IsolineTracer<'a>,
    level: f64,
    bottom_marks: Vec<bool>,
    left_marks: Vec<bool>,
}

impl<'t, 'a> LevelTrace<'t, 'a> {
    fn new(tracer: &'t IsolineTracer<'a>, level: f64) -> Self {
        let columns = tracer.columns();
        let rows = tracer.rows();
        Self {
            tracer,
            level,
            bottom_marks: vec![false; columns.saturating_sub(1) * rows],
            left_marks: vec![false; columns * rows.saturating_sub(1)],
        }
    }

    fn run(mut self) -> Result<Vec<Isoline>, GridError> {
        let edges = self.edges();
        let mut isolines = vec![];

        for edge in &edges {
            if !self.is_crossed(*edge) || self.is_marked(*edge) {
                continue;
            }

            let windows = self.adjacent_windows(*edge);
            if let [(window, enter)] = windows.as_slice() {
                isolines.push(self.trace(*window, *enter, *edge)?);
            }
        }

        for edge in &edges {
            if !self.is_crossed(*edge) || self.is_marked(*edge) {
                continue;
            }

            let (window, enter) = match *edge {
                Edge::Horizontal(i, j) => (Window { i, j }, Side::Bottom),
                Edge::Vertical(i, j) => (Window { i, j }, Side::Left),
            };

            if self.is_valid_window(window) {
                isolines.push(self.trace(window, enter, *edge)?);
            }
        }

        Ok(isolines)
    }

    fn edges(&self) -> Vec<Edge> {
        let columns = self.tracer.columns();
        let rows = self.tracer.rows();

        let horizontal = (0..rows)
            .flat_map(|j| (0..columns.saturating_sub(1)).map(move |i| Edge::Horizontal(i, j)));
        let vertical = (0..rows.saturating_sub(1))
            .flat_map(|j| (0..columns).map(move |i| Edge::Vertical(i, j)));

        horizontal.chain(vertical).collect()
    }

    /// Valid windows containing the edge, with the side the edge is in each of them.
    fn adjacent_windows(&self, edge: Edge) -> Vec<(Window, Side)> {
        let candidates = match edge {
            Edge::Horizontal(i, j) => [
                Some((Window { i, j }, Side::Bottom)),
                j.checked_sub(1).map(|j| (Window { i, j }, Side::Top)),
            ],
            Edge::Vertical(i, j) => [
                Some((Window { i, j }, Side::Left)),
                i.checked_sub(1).map(|i| (Window { i, j }, Side::Right)),
            ],
        };

        candidates
            .into_iter()
            .flatten()
            .filter(|(window, _)| self.is_valid_window(*window))
            .collect()
    }

    fn is_valid_window(&self, window: Window) -> bool {
        let Window { i, j } = window;
        i + 1 < self.tracer.columns()
            && j + 1 < self.tracer.rows()
            && self.tracer.is_valid_node(i, j)
            && self.tracer.is_valid_node(i + 1, j)
            && self.tracer.is_valid_node(i + 1, j + 1)
            && self.tracer.is_valid_node(i, j + 1)
    }

    fn value_node(&self, i: usize, j: usize) -> Option<GridCell> {
        if !self.tracer.is_valid_node(i, j) {
            return None;
        }

        self.tracer
            .node(i, j)
            .map(|n| GridCell::new(n.center_x, n.center_y, nudge(n.value, self.level)))
    }

    fn is_crossed(&self, edge: Edge) -> bool {
        let [(ai, aj), (bi, bj)] = edge.nodes();
        match (self.value_node(ai, aj), self.value_node(bi, bj)) {
            (Some(a), Some(b)) => (a.value > self.level) != (b.value > self.level),
            _ => false,
        }
    }

    /// Point where the isoline crosses the edge, by linear interpolation between its nodes.
    fn crossing(&self, edge: Edge) -> Option<GridCell> {
        let [(ai, aj), (bi, bj)] = edge.nodes();
        let a = self.value_node(ai, aj)?;
        let b = self.value_node(bi, bj)?;

        let t = if a.value == b.value {
            0.5
        } else {
            (self.level - a.value) / (b.value - a.value)
        };

        Some(GridCell::new(
            a.center_x + t * (b.center_x - a.center_x),
            a.center_y + t * (b.center_y - a.center_y),
            self.level,
        ))
    }

    fn rectangle(&self, window: Window) -> Option<ValueRectangle> {
        let Window { i, j } = window;
        Some(ValueRectangle::new(
            *self.tracer.node(i, j)?,
            *self.tracer.node(i + 1, j)?,
            *self.tracer.node(i + 1, j + 1)?,
            *self.tracer.node(i, j + 1)?,
            self.level,
        ))
    }

    fn mark_index(&self, edge: Edge) -> (bool, usize) {
        let columns = self.tracer.columns();
        match edge {
            Edge::Horizontal(i, j) => (true, j * columns.saturating_sub(1) + i),
            Edge::Vertical(i, j) => (false, j * columns + i),
        }
    }

    fn is_marked(&self, edge: Edge) -> bool {
        let (horizontal, index) = self.mark_index(edge);
        let marks = if horizontal {
            &self.bottom_marks
        } else {
            &self.left_marks
        };

        marks.get(index).copied().unwrap_or(true)
    }

    fn mark(&mut self, edge: Edge) {
        let (horizontal, index) = self.mark_index(edge);
        let marks = if horizontal {
            &mut self.bottom_marks
        } else {
            &mut self.left_marks
        };

        if let Some(mark) = marks.get_mut(index) {
            *mark = true;
        }
    }

    fn exit_side(&self, window: Window, enter: Side) -> Result<Side, GridError> {
        let unresolved = GridError::UnresolvedCell {
            column: window.i,
            row: window.j,
        };
        let Some(rect) = self.rectangle(window) else {
            return Err(unresolved);
        };

        match rect.case(self.level) {
            CellCase::Saddle => {
                resolve_saddle(&rect, enter, self.level, 0).map_err(|err| match err {
                    SaddleError::TooDeep(depth) => GridError::InsufficientDetail {
                        column: window.i,
                        row: window.j,
                        depth,
                    },
                    SaddleError::NoExit => unresolved,
                })
            }
            case => case.pass_exit(enter).ok_or(unresolved),
        }
    }

    /// Follows an isoline entering `window` through the `enter` side, which is `start` edge.
    fn trace(
        &mut self,
        mut window: Window,
        mut enter: Side,
        start: Edge,
    ) -> Result<Isoline, GridError> {
        let first = self.crossing(start).ok_or(GridError::UnresolvedCell {
            column: window.i,
            row: window.j,
        })?;
        let mut points = vec![first];
        self.mark(start);

        let is_closed = loop {
            let exit = self.exit_side(window, enter)?;
            let exit_edge = window.edge(exit);

            if exit_edge == start {
                points.push(first);
                break true;
            }

            if self.is_marked(exit_edge) {
                break false;
            }

            let Some(point) = self.crossing(exit_edge) else {
                break false;
            };
            points.push(point);
            self.mark(exit_edge);

            match window.neighbour(exit) {
                Some(next) if self.is_valid_window(next) => {
                    window = next;
                    enter = exit.opposite();
                }
                _ => break false,
            }
        };

        Ok(Isoline {
            level: self.level,
            points,
            is_closed,
        })
    }
}
