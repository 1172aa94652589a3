use crate::cell::GridCell;
use crate::isoline::side::Side;

const RELATIVE_EPSILON: f64 = 1e-5;
const ZERO_EPSILON: f64 = 1e-12;

/// Moves a value equal to the level slightly below it, so that every corner is strictly above or below the level.
pub(crate) fn nudge(value: f64, level: f64) -> f64 {
    if value != level {
        return value;
    }

    let eps = if level == 0.0 {
        ZERO_EPSILON
    } else {
        level.abs() * RELATIVE_EPSILON
    };

    level - eps
}

/// What the isoline does inside a window with a given corner pattern.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum CellCase {
    /// All corners on the same side of the level.
    Empty,
    /// The isoline crosses exactly these two sides.
    Pass(Side, Side),
    /// Diagonal corners on the same side of the level. All four sides are crossed.
    Saddle,
}

impl CellCase {
    /// Exit side for an isoline entering through `enter`. `None` if `enter` is not crossed.
    pub(crate) fn pass_exit(self, enter: Side) -> Option<Side> {
        match self {
            CellCase::Pass(a, b) if a == enter => Some(b),
            CellCase::Pass(a, b) if b == enter => Some(a),
            _ => None,
        }
    }
}

/// Case for every corner pattern. Bit is set when the corner is above the level: `lb = 1`, `br = 2`, `rt = 4`,
/// `tl = 8`.
const CASES: [CellCase; 16] = [
    CellCase::Empty,
    CellCase::Pass(Side::Bottom, Side::Left),
    CellCase::Pass(Side::Bottom, Side::Right),
    CellCase::Pass(Side::Left, Side::Right),
    CellCase::Pass(Side::Right, Side::Top),
    CellCase::Saddle,
    CellCase::Pass(Side::Bottom, Side::Top),
    CellCase::Pass(Side::Top, Side::Left),
    CellCase::Pass(Side::Top, Side::Left),
    CellCase::Pass(Side::Bottom, Side::Top),
    CellCase::Saddle,
    CellCase::Pass(Side::Right, Side::Top),
    CellCase::Pass(Side::Left, Side::Right),
    CellCase::Pass(Side::Bottom, Side::Right),
    CellCase::Pass(Side::Bottom, Side::Left),
    CellCase::Empty,
];

/// Four corners of a window with their values already nudged off the level.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct ValueRectangle {
    pub lb: GridCell,
    pub br: GridCell,
    pub rt: GridCell,
    pub tl: GridCell,
}

impl ValueRectangle {
    pub(crate) fn new(lb: GridCell, br: GridCell, rt: GridCell, tl: GridCell, level: f64) -> Self {
        let nudged = |c: GridCell| GridCell::new(c.center_x, c.center_y, nudge(c.value, level));
        Self {
            lb: nudged(lb),
            br: nudged(br),
            rt: nudged(rt),
            tl: nudged(tl),
        }
    }

    pub(crate) fn pattern(&self, level: f64) -> usize {
        [self.lb, self.br, self.rt, self.tl]
            .iter()
            .enumerate()
            .filter(|(_, c)| c.value > level)
            .fold(0, |acc, (bit, _)| acc | (1 << bit))
    }

    pub(crate) fn case(&self, level: f64) -> CellCase {
        CASES[self.pattern(level)]
    }

    /// Corners at the ends of the side.
    pub(crate) fn side_corners(&self, side: Side) -> (GridCell, GridCell) {
        match side {
            Side::Bottom => (self.lb, self.br),
            Side::Right => (self.br, self.rt),
            Side::Top => (self.tl, self.rt),
            Side::Left => (self.lb, self.tl),
        }
    }

    pub(crate) fn is_crossed(&self, side: Side, level: f64) -> bool {
        let (a, b) = self.side_corners(side);
        (a.value > level) != (b.value > level)
    }

    /// Splits the window into quadrants using averaged values at side midpoints and at the centre.
    ///
    /// Returned in the order of [`Quadrant`] variants.
    pub(crate) fn split(&self, level: f64) -> [ValueRectangle; 4] {
        let mid = |a: GridCell, b: GridCell| {
            GridCell::new(
                (a.center_x + b.center_x) / 2.0,
                (a.center_y + b.center_y) / 2.0,
                (a.value + b.value) / 2.0,
            )
        };

        let mb = mid(self.lb, self.br);
        let mr = mid(self.br, self.rt);
        let mt = mid(self.tl, self.rt);
        let ml = mid(self.lb, self.tl);
        let c = mid(mb, mt);
        let c = GridCell::new(
            c.center_x,
            c.center_y,
            (self.lb.value + self.br.value + self.rt.value + self.tl.value) / 4.0,
        );

        [
            ValueRectangle::new(self.lb, mb, c, ml, level),
            ValueRectangle::new(mb, self.br, mr, c, level),
            ValueRectangle::new(c, mr, self.rt, mt, level),
            ValueRectangle::new(ml, c, mt, self.tl, level),
        ]
    }
}

/// Quarter of a window produced by [`ValueRectangle::split`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Quadrant {
    LeftBottom = 0,
    RightBottom = 1,
    RightTop = 2,
    LeftTop = 3,
}

impl Quadrant {
    /// Quadrants sharing the given side of the parent window, in the direction of the side.
    pub(crate) fn on_side(side: Side) -> [Quadrant; 2] {
        match side {
            Side::Bottom => [Quadrant::LeftBottom, Quadrant::RightBottom],
            Side::Right => [Quadrant::RightBottom, Quadrant::RightTop],
            Side::Top => [Quadrant::LeftTop, Quadrant::RightTop],
            Side::Left => [Quadrant::LeftBottom, Quadrant::LeftTop],
        }
    }

    /// Quadrant behind the given side, or `None` if the side lies on the border of the parent window.
    pub(crate) fn neighbour(self, side: Side) -> Option<Quadrant> {
        match (self, side) {
            (Quadrant::LeftBottom, Side::Right) => Some(Quadrant::RightBottom),
            (Quadrant::LeftBottom, Side::Top) => Some(Quadrant::LeftTop),
            (Quadrant::RightBottom, Side::Left) => Some(Quadrant::LeftBottom),
            (Quadrant::RightBottom, Side::Top) => Some(Quadrant::RightTop),
            (Quadrant::RightTop, Side::Bottom) => Some(Quadrant::RightBottom),
            (Quadrant::RightTop, Side::Left) => Some(Quadrant::LeftTop),
            (Quadrant::LeftTop, Side::Bottom) => Some(Quadrant::LeftBottom),
            (Quadrant::LeftTop, Side::Right) => Some(Quadrant::RightTop),
            _ => None,
        }
    }
}
