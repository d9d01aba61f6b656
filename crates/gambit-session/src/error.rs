//! Error types for the session layer.

use gambit_board::BoardError;

/// Errors raised while assigning seats or applying match messages.
///
/// None of these end a connection on their own. The caller decides:
/// the server turns [`Capacity`](Self::Capacity) into a rejection, a
/// client logs the rest and carries on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A player asked for a seat after every playable team was taken.
    #[error("no team at ordinal {ordinal}: match holds {capacity} players")]
    Capacity { ordinal: i32, capacity: usize },

    /// A Welcome arrived missing or with fields that don't agree.
    #[error("invalid welcome: {0}")]
    InvalidWelcome(String),

    /// A remote move or capture referenced a cell or piece this client
    /// doesn't have. The local board is left as it was.
    #[error("board out of sync: {0}")]
    Desync(#[from] BoardError),
}
