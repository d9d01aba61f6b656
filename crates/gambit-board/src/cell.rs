//! Cells and the small value types they carry.

use std::fmt;

use gambit_protocol::Coord;

/// A point in continuous world space, e.g. where a pointer ray hit the
/// table. Cells are laid out on the `x`/`z` plane with `y` up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// Handle to a piece owned by a [`Board`](crate::Board).
///
/// Cells store this instead of the piece itself: the board owns pieces,
/// a cell only records which one is standing on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub(crate) u32);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "piece-{}", self.0)
    }
}

/// One square of the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    coord: Coord,
    anchor: Point3,
    pub(crate) piece: Option<PieceId>,
    pub(crate) highlighted: bool,
}

impl Cell {
    pub(crate) fn new(coord: Coord, spacing: f32) -> Self {
        Self {
            coord,
            anchor: Point3::new(
                coord.x as f32 * spacing,
                0.0,
                coord.y as f32 * spacing,
            ),
            piece: None,
            highlighted: false,
        }
    }

    pub fn coord(&self) -> Coord {
        self.coord
    }

    /// World-space position of the cell's centre.
    pub fn anchor(&self) -> Point3 {
        self.anchor
    }

    /// The piece on this cell, if any.
    pub fn piece(&self) -> Option<PieceId> {
        self.piece
    }

    pub fn is_occupied(&self) -> bool {
        self.piece.is_some()
    }

    /// Whether the cell is currently marked as a valid target.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    /// Checkerboard shading: `(x + y)` even is dark.
    pub fn is_dark(&self) -> bool {
        (self.coord.x + self.coord.y) % 2 == 0
    }
}
