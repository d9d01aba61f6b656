//! Core protocol types for Gambit's wire format.
//!
//! This module defines every type that travels "on the wire": the
//! values a peer writes into a frame, sends over the network, and the
//! other side reads back.
//!
//! Think of this as the "vocabulary" the server and clients share.

// Serde derives let applications log or persist these values as JSON.
// The wire itself uses the hand-laid binary format in `codec.rs`.
use serde::{Deserialize, Serialize};

use std::fmt;

use gambit_transport::ConnectionId;

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// One side of the match.
///
/// The discriminants are the team's **ordinal**: the number that goes on
/// the wire and the number the server hands out as players connect.
/// Ordinal 0 is reserved for "no team yet", so the first player gets 1
/// (White) and the second gets 2 (Black).
///
/// `#[repr(u8)]` pins each variant to a single byte so `team as u8` is
/// exactly the ordinal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Team {
    /// Not assigned yet. Never handed to a player.
    #[default]
    None = 0,
    /// First player to connect. Moves first.
    White = 1,
    /// Second player to connect.
    Black = 2,
}

impl Team {
    /// The teams a player can actually be assigned, in ordinal order.
    ///
    /// Its length is the match capacity: asking for ordinal
    /// `PLAYABLE.len() + 1` is a capacity error, not a wrap-around.
    pub const PLAYABLE: [Team; 2] = [Team::White, Team::Black];

    /// Looks up a team by ordinal. Returns `None` for anything that isn't
    /// a defined ordinal (negative numbers included).
    pub fn from_ordinal(ordinal: i32) -> Option<Team> {
        match ordinal {
            0 => Some(Team::None),
            1 => Some(Team::White),
            2 => Some(Team::Black),
            _ => None,
        }
    }

    /// Returns this team's ordinal.
    pub fn ordinal(self) -> i32 {
        self as i32
    }

    /// Returns `true` for White and Black.
    pub fn is_playable(self) -> bool {
        self != Team::None
    }

    /// The other playable team. `None` has no opponent.
    pub fn opponent(self) -> Team {
        match self {
            Team::White => Team::Black,
            Team::Black => Team::White,
            Team::None => Team::None,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Team::None => "None",
            Team::White => "White",
            Team::Black => "Black",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// OperationCode
// ---------------------------------------------------------------------------

/// Identifies what kind of message a frame holds.
///
/// Every frame starts with exactly one of these as its first byte. Both
/// the codec (to pick a payload layout) and the dispatcher (to pick
/// handlers) key off this value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum OperationCode {
    /// Liveness ping. Empty payload.
    KeepAlive = 1,
    /// Team assignment. Client asks with an empty one, server fills it in.
    Welcome = 2,
    /// Both seats are taken; the game begins. Empty payload.
    StartGame = 3,
    /// A piece moved from one cell to another.
    MakeMove = 4,
    /// A piece on a cell was captured.
    GetCaptured = 5,
    /// The server refused the connection.
    Rejected = 6,
}

impl OperationCode {
    /// Every defined code, in wire order.
    pub const ALL: [OperationCode; 6] = [
        OperationCode::KeepAlive,
        OperationCode::Welcome,
        OperationCode::StartGame,
        OperationCode::MakeMove,
        OperationCode::GetCaptured,
        OperationCode::Rejected,
    ];

    /// Parses a wire byte. Returns `None` for unknown codes.
    pub fn from_u8(byte: u8) -> Option<OperationCode> {
        Self::ALL.into_iter().find(|code| *code as u8 == byte)
    }
}

impl fmt::Display for OperationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationCode::KeepAlive => "KEEP_ALIVE",
            OperationCode::Welcome => "WELCOME",
            OperationCode::StartGame => "START_GAME",
            OperationCode::MakeMove => "MAKE_MOVE",
            OperationCode::GetCaptured => "GET_CAPTURED",
            OperationCode::Rejected => "REJECTED",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Coordinates and payloads
// ---------------------------------------------------------------------------

/// An integer cell coordinate on the board.
///
/// Signed on purpose: the wire carries `i32`s, and a negative value must
/// survive decoding so the board can report "no such cell" instead of the
/// codec silently wrapping it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    Serialize, Deserialize,
)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Server → client: "here is your seat."
///
/// The client sends one with default values right after connecting; the
/// server fills in both fields and sends it back to that client only.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub struct Welcome {
    /// 1-based position of the player in connection order.
    pub assigned_int_team: i32,
    /// The team at that ordinal.
    pub team: Team,
}

/// A move one side already applied locally and now reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveData {
    /// The side that made the move.
    pub team: Team,
    pub original_coord: Coord,
    pub target_coord: Coord,
}

/// A capture one side already applied locally and now reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureData {
    /// The side that made the capture (not the side that lost the piece).
    pub team: Team,
    pub captured_cell_coordinates: Coord,
}

/// Why the server refused a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum RejectReason {
    /// Every playable team is already taken.
    MatchFull = 1,
}

impl RejectReason {
    /// Parses a wire byte. Returns `None` for unknown reasons.
    pub fn from_u8(byte: u8) -> Option<RejectReason> {
        match byte {
            1 => Some(RejectReason::MatchFull),
            _ => None,
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MatchFull => f.write_str("match is full"),
        }
    }
}

// ---------------------------------------------------------------------------
// NetMessage: every message that crosses the wire
// ---------------------------------------------------------------------------

/// A decoded frame.
///
/// This is a Rust `enum` carrying data per variant (a "sum type"), so a
/// handler that matches on it gets the payload already typed, no casting
/// from a base message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetMessage {
    KeepAlive,
    Welcome(Welcome),
    StartGame,
    MakeMove(MoveData),
    GetCaptured(CaptureData),
    Rejected(RejectReason),
}

impl NetMessage {
    /// Returns the operation code this message is written with.
    pub fn code(&self) -> OperationCode {
        match self {
            NetMessage::KeepAlive => OperationCode::KeepAlive,
            NetMessage::Welcome(_) => OperationCode::Welcome,
            NetMessage::StartGame => OperationCode::StartGame,
            NetMessage::MakeMove(_) => OperationCode::MakeMove,
            NetMessage::GetCaptured(_) => OperationCode::GetCaptured,
            NetMessage::Rejected(_) => OperationCode::Rejected,
        }
    }
}

// ---------------------------------------------------------------------------
// Recipient: who should receive an outbound message?
// ---------------------------------------------------------------------------

/// Where the server should deliver a message.
///
/// Session handlers return `(Recipient, NetMessage)` pairs instead of
/// sending anything themselves. The server loop owns the connections and
/// does the actual delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every open connection.
    All,

    /// One specific connection.
    Connection(ConnectionId),
}

// =========================================================================
// Tests
// =========================================================================
