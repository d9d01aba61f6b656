//! Unified error type for Gambit.

use std::path::PathBuf;

use gambit_board::BoardError;
use gambit_protocol::ProtocolError;
use gambit_session::SessionError;
use gambit_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `gambit` meta-crate, you deal with this single error
/// type instead of importing errors from each sub-crate. The `#[from]`
/// attributes let `?` convert sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GambitError {
    /// A transport-level error (connect, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A frame that couldn't be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A board lookup or move failed.
    #[error(transparent)]
    Board(#[from] BoardError),

    /// Seat assignment or match state rejected a message.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The config file couldn't be read.
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The config file isn't valid JSON for [`GambitConfig`](crate::GambitConfig).
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
