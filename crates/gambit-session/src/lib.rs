//! Match state for Gambit.
//!
//! Two halves of one protocol:
//!
//! 1. **Server side**: [`ServerSession`] hands out teams in connection
//!    order, starts the game once both seats are filled, and relays moves.
//! 2. **Client side**: [`ClientMatchState`] remembers our team and whose
//!    turn it is, drops our own relayed moves, and replays the opponent's
//!    on the local [`Board`](gambit_board::Board).
//!
//! # How it fits in the stack
//!
//! ```text
//! Server / client loops (above)  ← feed decoded messages in, send results out
//!     ↕
//! Session Layer (this crate)     ← seats, phases, turns, echo suppression
//!     ↕
//! Board + Protocol (below)       ← cells and pieces, message types
//! ```

mod client;
mod error;
mod server;

pub use client::{ClientMatchState, MatchPhase, RemoteOutcome};
pub use error::SessionError;
pub use server::ServerSession;
