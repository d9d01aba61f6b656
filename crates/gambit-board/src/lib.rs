//! The board side of a Gambit match.
//!
//! A [`Board`] is a fixed grid of [`Cell`]s addressed by [`Coord`]. It
//! owns the pieces standing on it and runs the click-to-move selection
//! state machine. Game rules and drawing are supplied from outside
//! through the [`Piece`] and [`Presentation`] traits.
//!
//! # Key types
//!
//! - [`Board`]: cell lookup, local moves, replay of remote moves
//! - [`Piece`]: movement rules for one piece
//! - [`Presentation`]: camera and highlighting
//! - [`SelectionOutcome`]: what a click did
//! - [`BoardConfig`]: board dimensions
//!
//! [`Coord`]: gambit_protocol::Coord

mod board;
mod cell;
mod config;
mod error;
mod piece;
mod selection;

pub use board::{Board, MoveRecord};
pub use cell::{Cell, PieceId, Point3};
pub use config::BoardConfig;
pub use error::BoardError;
pub use piece::{Headless, Piece, Presentation};
pub use selection::SelectionOutcome;
