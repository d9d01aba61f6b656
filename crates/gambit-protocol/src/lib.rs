//! Wire protocol for Gambit.
//!
//! This crate defines the "language" that the server and clients speak:
//!
//! - **Types** ([`NetMessage`], [`Team`], [`OperationCode`], [`Coord`], …):
//!   the values that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`BinaryCodec`]): how those messages are
//!   converted to/from frames.
//! - **Dispatch** ([`Dispatcher`]): who reacts when a message arrives.
//! - **Errors** ([`ProtocolError`]): what can go wrong while decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (frames) → Codec (NetMessage) → Dispatcher → Session / Board
//! ```

mod codec;
mod dispatch;
mod error;
mod types;

pub use codec::{BinaryCodec, Codec};
pub use dispatch::{Dispatcher, Handler, Side, SubscriptionId};
pub use error::ProtocolError;
pub use types::{
    CaptureData, Coord, MoveData, NetMessage, OperationCode, Recipient,
    RejectReason, Team, Welcome,
};

// Re-exported so downstream crates can name connections without a direct
// dependency on the transport crate.
pub use gambit_transport::ConnectionId;
