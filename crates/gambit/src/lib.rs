//! # Gambit
//!
//! Keeps a two-player board game in step across a server and its clients.
//!
//! The server hands out teams, announces the start and relays every move
//! to both players without checking it. Each client validates its own
//! moves against its [`Piece`](gambit_board::Piece) rules, applies them
//! locally, and replays the opponent's moves as they come back.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gambit::prelude::*;
//!
//! # async fn run() -> Result<(), GambitError> {
//! let server = GambitServer::builder()
//!     .bind("127.0.0.1:7777")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod client;
mod config;
mod error;
mod handler;
mod server;

pub use client::{ClientContext, ClientEvent, GameClient};
pub use config::{GambitConfig, ServerConfig};
pub use error::GambitError;
pub use server::{GambitServer, GambitServerBuilder};

pub mod prelude {
    //! Everything needed to run a server or write a client.

    pub use crate::{
        ClientContext, ClientEvent, GambitConfig, GambitError, GambitServer,
        GambitServerBuilder, GameClient, ServerConfig,
    };
    pub use gambit_board::{
        Board, BoardConfig, BoardError, Cell, Headless, MoveRecord, Piece, PieceId, Point3,
        Presentation, SelectionOutcome,
    };
    pub use gambit_protocol::{
        BinaryCodec, CaptureData, Codec, ConnectionId, Coord, Dispatcher, MoveData, NetMessage,
        OperationCode, RejectReason, Side, Team, Welcome,
    };
    pub use gambit_session::{ClientMatchState, MatchPhase, RemoteOutcome, SessionError};
}
