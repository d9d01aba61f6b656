//! Codec trait and the binary implementation used on the wire.
//!
//! A "codec" (coder/decoder) converts between [`NetMessage`] and raw
//! bytes. The server and client only need *something* that implements
//! [`Codec`]; this is the "strategy pattern": define the interface, swap
//! implementations (a recording codec in tests, say) without touching the
//! callers.
//!
//! # Frame layout
//!
//! ```text
//! byte 0      OperationCode
//! bytes 1..   payload, fixed field order, little-endian
//!
//! KEEP_ALIVE    (empty)
//! WELCOME       i32 assigned_int_team, u8 team
//! START_GAME    (empty)
//! MAKE_MOVE     u8 team, i32 ox, i32 oy, i32 tx, i32 ty
//! GET_CAPTURED  u8 team, i32 x, i32 y
//! REJECTED      u8 reason
//! ```

use bytes::{Buf, BufMut, BytesMut};

use crate::{
    CaptureData, Coord, MoveData, NetMessage, OperationCode, ProtocolError,
    RejectReason, Team, Welcome,
};

/// Size of the largest frame (MAKE_MOVE): code + team + four `i32`s.
const MAX_FRAME_LEN: usize = 1 + 1 + 4 * 4;

/// Converts messages to frames and back.
///
/// ## Trait bounds explained
///
/// - `Send + Sync` → the codec lives inside the match actor and game
///   clients, which Tokio may move between threads.
/// - `'static` → it owns everything it needs, so it can live inside
///   long-lived tasks.
pub trait Codec: Send + Sync + 'static {
    /// Writes the operation code followed by the payload.
    ///
    /// # Errors
    /// Implementations may refuse values they can't represent.
    /// [`BinaryCodec`] never fails.
    fn encode(&self, message: &NetMessage) -> Result<Vec<u8>, ProtocolError>;

    /// Reads a payload whose operation code was already consumed.
    ///
    /// # Errors
    /// Returns a [`ProtocolError`] if the payload is too short, too long,
    /// or carries an ordinal that doesn't map to a known value.
    fn decode_payload(
        &self,
        code: OperationCode,
        payload: &[u8],
    ) -> Result<NetMessage, ProtocolError>;

    /// Reads a whole frame: the code byte, then the payload.
    ///
    /// # Errors
    /// [`ProtocolError::EmptyFrame`] for zero bytes,
    /// [`ProtocolError::UnknownCode`] for an unrecognized first byte, plus
    /// anything [`decode_payload`](Self::decode_payload) reports.
    fn decode(&self, frame: &[u8]) -> Result<NetMessage, ProtocolError> {
        let (&first, payload) =
            frame.split_first().ok_or(ProtocolError::EmptyFrame)?;
        let code = OperationCode::from_u8(first)
            .ok_or(ProtocolError::UnknownCode(first))?;
        self.decode_payload(code, payload)
    }
}

// ---------------------------------------------------------------------------
// BinaryCodec
// ---------------------------------------------------------------------------

/// The fixed-width binary [`Codec`] described in the module docs.
///
/// ## Example
///
/// ```rust
/// use gambit_protocol::{BinaryCodec, Codec, Coord, MoveData, NetMessage, Team};
///
/// let codec = BinaryCodec;
/// let msg = NetMessage::MakeMove(MoveData {
///     team: Team::White,
///     original_coord: Coord::new(2, 2),
///     target_coord: Coord::new(2, 3),
/// });
///
/// let frame = codec.encode(&msg).unwrap();
/// assert_eq!(frame[0], 4); // MAKE_MOVE
/// assert_eq!(codec.decode(&frame).unwrap(), msg);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl Codec for BinaryCodec {
    fn encode(&self, message: &NetMessage) -> Result<Vec<u8>, ProtocolError> {
        let mut buf = BytesMut::with_capacity(MAX_FRAME_LEN);
        buf.put_u8(message.code() as u8);

        match message {
            NetMessage::KeepAlive | NetMessage::StartGame => {}
            NetMessage::Welcome(welcome) => {
                buf.put_i32_le(welcome.assigned_int_team);
                buf.put_u8(welcome.team as u8);
            }
            NetMessage::MakeMove(mv) => {
                buf.put_u8(mv.team as u8);
                put_coord(&mut buf, mv.original_coord);
                put_coord(&mut buf, mv.target_coord);
            }
            NetMessage::GetCaptured(capture) => {
                buf.put_u8(capture.team as u8);
                put_coord(&mut buf, capture.captured_cell_coordinates);
            }
            NetMessage::Rejected(reason) => {
                buf.put_u8(*reason as u8);
            }
        }

        Ok(buf.to_vec())
    }

    fn decode_payload(
        &self,
        code: OperationCode,
        payload: &[u8],
    ) -> Result<NetMessage, ProtocolError> {
        let mut reader = PayloadReader { code, buf: payload };

        let message = match code {
            OperationCode::KeepAlive => NetMessage::KeepAlive,
            OperationCode::StartGame => NetMessage::StartGame,
            OperationCode::Welcome => NetMessage::Welcome(Welcome {
                assigned_int_team: reader.i32()?,
                team: reader.team()?,
            }),
            OperationCode::MakeMove => NetMessage::MakeMove(MoveData {
                team: reader.team()?,
                original_coord: reader.coord()?,
                target_coord: reader.coord()?,
            }),
            OperationCode::GetCaptured => {
                NetMessage::GetCaptured(CaptureData {
                    team: reader.team()?,
                    captured_cell_coordinates: reader.coord()?,
                })
            }
            OperationCode::Rejected => {
                let byte = reader.u8()?;
                let reason = RejectReason::from_u8(byte)
                    .ok_or(ProtocolError::InvalidRejectReason(byte))?;
                NetMessage::Rejected(reason)
            }
        };

        reader.finish()?;
        Ok(message)
    }
}

fn put_coord(buf: &mut BytesMut, coord: Coord) {
    buf.put_i32_le(coord.x);
    buf.put_i32_le(coord.y);
}

/// Bounds-checked reads over a payload slice.
///
/// `Buf::get_*` panics when the buffer is short, so every read checks
/// `remaining()` first and turns a short buffer into
/// [`ProtocolError::Truncated`].
struct PayloadReader<'a> {
    code: OperationCode,
    buf: &'a [u8],
}

impl PayloadReader<'_> {
    fn ensure(&self, needed: usize) -> Result<(), ProtocolError> {
        if self.buf.remaining() < needed {
            return Err(ProtocolError::Truncated {
                code: self.code,
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8, ProtocolError> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    fn i32(&mut self) -> Result<i32, ProtocolError> {
        self.ensure(4)?;
        Ok(self.buf.get_i32_le())
    }

    fn team(&mut self) -> Result<Team, ProtocolError> {
        let byte = self.u8()?;
        Team::from_ordinal(i32::from(byte))
            .ok_or(ProtocolError::InvalidTeam(byte))
    }

    fn coord(&mut self) -> Result<Coord, ProtocolError> {
        Ok(Coord {
            x: self.i32()?,
            y: self.i32()?,
        })
    }

    fn finish(self) -> Result<(), ProtocolError> {
        match self.buf.remaining() {
            0 => Ok(()),
            count => Err(ProtocolError::TrailingBytes {
                code: self.code,
                count,
            }),
        }
    }
}
