/// Side of a cell window, in grid index space (bottom is the southern side).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Side {
    Bottom,
    Right,
    Top,
    Left,
}

impl Side {
    #[cfg(test)]
    pub(crate) const ALL: [Side; 4] = [Side::Bottom, Side::Right, Side::Top, Side::Left];

    /// The same edge as seen from the neighbouring window.
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Bottom => Side::Top,
            Side::Right => Side::Left,
            Side::Top => Side::Bottom,
            Side::Left => Side::Right,
        }
    }
}
