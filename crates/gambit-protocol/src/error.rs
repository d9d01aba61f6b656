//! Error types for the protocol layer.
//!
//! Each crate in Gambit defines its own error enum. When you see a
//! `ProtocolError`, you know the problem is in turning bytes into a
//! message (or back), not in networking or game state.

use crate::OperationCode;

/// Errors that can occur while encoding or decoding a frame.
///
/// Every variant means "this frame is unusable". The receiver drops the
/// whole frame and keeps the connection: decoding never hands back a
/// half-built message.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The frame had no bytes at all, so not even an operation code.
    #[error("empty frame")]
    EmptyFrame,

    /// The first byte is not a known [`OperationCode`].
    #[error("unknown operation code {0}")]
    UnknownCode(u8),

    /// The payload ended before all fields of the message were read.
    ///
    /// `needed` is how many more bytes the next field required and
    /// `remaining` is how many were actually left.
    #[error("truncated {code} payload: needed {needed} bytes, {remaining} left")]
    Truncated {
        code: OperationCode,
        needed: usize,
        remaining: usize,
    },

    /// The payload had extra bytes after the last field.
    ///
    /// Payloads are fixed-size, so leftovers mean sender and receiver
    /// disagree on the message layout.
    #[error("{count} trailing bytes after {code} payload")]
    TrailingBytes { code: OperationCode, count: usize },

    /// A team ordinal on the wire doesn't name a [`Team`](crate::Team).
    #[error("invalid team ordinal {0}")]
    InvalidTeam(u8),

    /// A rejection reason on the wire isn't one we know.
    #[error("invalid reject reason {0}")]
    InvalidRejectReason(u8),
}
