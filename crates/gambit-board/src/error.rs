//! Error types for the board layer.

use gambit_protocol::Coord;

/// Errors that can occur while looking up or mutating the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// No cell exists at this coordinate.
    #[error("no cell at {0}")]
    CellNotFound(Coord),

    /// The cell exists but holds no piece.
    #[error("no piece at {0}")]
    NoPiece(Coord),

    /// The destination already holds a piece and the operation can't
    /// displace it.
    #[error("cell {0} is occupied")]
    Occupied(Coord),

    /// The piece's rules don't allow moving to this cell.
    #[error("illegal move from {from} to {to}")]
    IllegalTarget { from: Coord, to: Coord },
}
