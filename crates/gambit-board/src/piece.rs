//! Collaborator traits: what the board needs from the game around it.
//!
//! The board doesn't know chess. It knows cells, occupancy and selection,
//! and asks two collaborators for everything else:
//!
//! - [`Piece`]: which cells a piece may move to, plus hooks fired when
//!   the board moves or removes it.
//! - [`Presentation`]: the camera and cell highlighting, i.e. whatever
//!   draws the board.

use std::collections::HashSet;

use gambit_protocol::{Coord, Team};

use crate::{Board, Cell};

/// A piece standing on the board.
///
/// Movement rules live entirely in [`valid_target_cells`]; the board
/// trusts the returned set when validating a local move and skips it for
/// moves reported by the other player (those were validated on their
/// side).
///
/// [`valid_target_cells`]: Piece::valid_target_cells
pub trait Piece: Sized {
    /// The side this piece belongs to.
    fn team(&self) -> Team;

    /// Cells this piece may move to from `from`, given the current board.
    fn valid_target_cells(&self, from: Coord, board: &Board<Self>)
        -> HashSet<Coord>;

    /// Called after the board moved this piece. Default: no-op.
    fn on_moved(&mut self, _from: Coord, _to: Coord) {}

    /// Called after the board removed this piece. Default: no-op.
    fn on_captured(&mut self) {}
}

/// Whatever renders the match.
pub trait Presentation {
    /// Points the camera at the board from `team`'s side.
    fn set_camera_for(&mut self, team: Team);

    /// Marks `cell` as a valid move target.
    fn highlight_cell(&mut self, cell: &Cell);

    /// Removes the mark from `cell`.
    fn clear_highlight(&mut self, cell: &Cell);
}

/// A [`Presentation`] that draws nothing. Used by headless clients and
/// bots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Headless;

impl Presentation for Headless {
    fn set_camera_for(&mut self, _team: Team) {}

    fn highlight_cell(&mut self, _cell: &Cell) {}

    fn clear_highlight(&mut self, _cell: &Cell) {}
}
