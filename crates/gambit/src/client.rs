//! `GameClient`: one player's connection, board and match state.
//!
//! The client is driven by its owner. [`GameClient::recv_event`] handles
//! one server frame at a time and [`GameClient::select`] handles one
//! click, so remote updates and local moves never interleave.

use std::collections::VecDeque;

use gambit_board::{Board, Piece, Point3, Presentation, SelectionOutcome};
use gambit_protocol::{
    BinaryCodec, CaptureData, Codec, Coord, Dispatcher, MoveData, NetMessage, OperationCode,
    RejectReason, Side, Team, Welcome,
};
use gambit_session::{ClientMatchState, MatchPhase, RemoteOutcome, SessionError};
use gambit_transport::{Connection, WebSocketConnection, WebSocketTransport};

use crate::GambitError;

/// Something the client's state did in response to a server frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// The server gave us a seat.
    Welcomed { team: Team, ordinal: i32 },
    /// Both seats are filled.
    GameStarted { team: Team },
    /// The opponent's move is now on our board.
    RemoteMoveApplied(MoveData),
    /// The opponent's capture is now on our board.
    RemoteCaptureApplied(CaptureData),
    /// Our own move or capture came back and was skipped.
    EchoIgnored(OperationCode),
    /// A relayed message didn't fit our board and was skipped.
    Desync(SessionError),
    /// The server turned us away. It closes the connection next.
    Rejected(RejectReason),
}

/// Everything client-side handlers can touch.
pub struct ClientContext<P, V> {
    pub state: ClientMatchState,
    pub board: Board<P>,
    pub presentation: V,
    events: VecDeque<ClientEvent>,
    replies: Vec<NetMessage>,
}

impl<P, V> ClientContext<P, V> {
    /// Queues an event for [`GameClient::recv_event`] to return.
    pub fn push_event(&mut self, event: ClientEvent) {
        self.events.push_back(event);
    }

    /// Queues a message to send back to the server.
    pub fn reply(&mut self, msg: NetMessage) {
        self.replies.push(msg);
    }
}

/// A connected player.
pub struct GameClient<P, V, C = BinaryCodec> {
    conn: WebSocketConnection,
    codec: C,
    dispatcher: Dispatcher<ClientContext<P, V>>,
    ctx: ClientContext<P, V>,
}

impl<P, V> GameClient<P, V>
where
    P: Piece + 'static,
    V: Presentation + 'static,
{
    /// Connects to a server at `addr` (`host:port`) and asks for a seat.
    ///
    /// The answer arrives as [`ClientEvent::Welcomed`] (or
    /// [`ClientEvent::Rejected`]) from [`recv_event`](Self::recv_event).
    pub async fn connect(addr: &str, board: Board<P>, presentation: V) -> Result<Self, GambitError> {
        Self::connect_with_codec(addr, board, presentation, BinaryCodec).await
    }
}

impl<P, V, C> GameClient<P, V, C>
where
    P: Piece + 'static,
    V: Presentation + 'static,
    C: Codec,
{
    /// Like [`connect`](GameClient::connect), with a custom codec.
    pub async fn connect_with_codec(
        addr: &str,
        board: Board<P>,
        presentation: V,
        codec: C,
    ) -> Result<Self, GambitError> {
        let conn = WebSocketTransport::connect(addr).await?;
        let client = Self {
            conn,
            codec,
            dispatcher: client_dispatcher(),
            ctx: ClientContext {
                state: ClientMatchState::new(),
                board,
                presentation,
                events: VecDeque::new(),
                replies: Vec::new(),
            },
        };

        send(&client.conn, &client.codec, &NetMessage::Welcome(Welcome::default())).await?;
        tracing::debug!(%addr, "welcome requested");
        Ok(client)
    }

    /// Waits for the next thing that happens to the match.
    ///
    /// Frames that produce no event (keep-alives, say) are handled and
    /// skipped. Undecodable frames are logged and dropped. Returns
    /// `Ok(None)` once the server closes the connection.
    pub async fn recv_event(&mut self) -> Result<Option<ClientEvent>, GambitError> {
        loop {
            if let Some(event) = self.ctx.events.pop_front() {
                return Ok(Some(event));
            }

            let Some(frame) = self.conn.recv().await? else {
                return Ok(None);
            };
            let msg = match self.codec.decode(&frame) {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping undecodable frame");
                    continue;
                }
            };

            self.dispatcher
                .publish(Side::Client, &mut self.ctx, &msg, None);

            for reply in std::mem::take(&mut self.ctx.replies) {
                send(&self.conn, &self.codec, &reply).await?;
            }
        }
    }

    /// Clicks on the cell at `coord`.
    ///
    /// Clicks are ignored until the game has started, and only our own
    /// pieces can be picked up. A completed move is applied locally first
    /// and then reported to the server, capture before move.
    pub async fn select(&mut self, coord: Coord) -> Result<SelectionOutcome, GambitError> {
        let ctx = &mut self.ctx;
        if ctx.state.phase() != MatchPhase::InProgress {
            tracing::debug!(%coord, phase = %ctx.state.phase(), "click before the game started");
            return Ok(SelectionOutcome::Ignored);
        }
        let team = ctx.state.current_team();
        let outcome = ctx.board.select_as(team, coord, &mut ctx.presentation);

        if let SelectionOutcome::MoveAttempted(Ok(record)) = &outcome {
            self.ctx.state.record_local_move(record);
            for msg in record.messages() {
                send(&self.conn, &self.codec, &msg).await?;
            }
        }
        Ok(outcome)
    }

    /// Clicks at a point in world space: the nearest cell is selected.
    ///
    /// Returns `Ok(None)` on a board with no cells.
    pub async fn select_at(&mut self, point: Point3) -> Result<Option<SelectionOutcome>, GambitError> {
        let Some(coord) = self.ctx.board.closest_cell_to(point).map(|c| c.coord()) else {
            return Ok(None);
        };
        self.select(coord).await.map(Some)
    }

    /// Our team, or `Team::None` before the Welcome arrives.
    pub fn current_team(&self) -> Team {
        self.ctx.state.current_team()
    }

    /// Returns `true` when it's our move.
    pub fn is_local_turn(&self) -> bool {
        self.ctx.state.is_local_turn()
    }

    pub fn state(&self) -> &ClientMatchState {
        &self.ctx.state
    }

    pub fn board(&self) -> &Board<P> {
        &self.ctx.board
    }

    pub fn presentation(&self) -> &V {
        &self.ctx.presentation
    }

    /// The client-side registry, for adding handlers of your own.
    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<ClientContext<P, V>> {
        &mut self.dispatcher
    }

    /// Closes the connection.
    pub async fn close(self) -> Result<(), GambitError> {
        self.conn.close().await?;
        Ok(())
    }
}

// Borrows fields, not `&GameClient`: the dispatcher is `!Sync`, so a
// `&GameClient` held across an await makes the future `!Send`.
async fn send<C: Codec>(
    conn: &WebSocketConnection,
    codec: &C,
    msg: &NetMessage,
) -> Result<(), GambitError> {
    let bytes = codec.encode(msg)?;
    conn.send(&bytes).await?;
    Ok(())
}

/// The client's built-in handlers.
fn client_dispatcher<P, V>() -> Dispatcher<ClientContext<P, V>>
where
    P: Piece + 'static,
    V: Presentation + 'static,
{
    let mut dispatcher = Dispatcher::new();

    dispatcher.subscribe(
        OperationCode::Welcome,
        Side::Client,
        |ctx: &mut ClientContext<P, V>, msg, _| {
            let welcome = match msg {
                NetMessage::Welcome(w) => Some(w),
                _ => None,
            };
            match ctx.state.on_welcome(welcome) {
                Ok(team) => {
                    let ordinal = ctx.state.ordinal();
                    ctx.push_event(ClientEvent::Welcomed { team, ordinal });
                }
                Err(e) => tracing::warn!(error = %e, "ignoring welcome"),
            }
        },
    );

    dispatcher.subscribe(
        OperationCode::StartGame,
        Side::Client,
        |ctx: &mut ClientContext<P, V>, _, _| {
            ctx.state.on_start_game(&mut ctx.presentation);
            let team = ctx.state.current_team();
            ctx.push_event(ClientEvent::GameStarted { team });
        },
    );

    dispatcher.subscribe(
        OperationCode::MakeMove,
        Side::Client,
        |ctx: &mut ClientContext<P, V>, msg, _| {
            let NetMessage::MakeMove(mv) = msg else { return };
            let result = ctx.state.on_make_move(mv, &mut ctx.board);
            let event = remote_event(result, OperationCode::MakeMove, ClientEvent::RemoteMoveApplied(*mv));
            ctx.push_event(event);
        },
    );

    dispatcher.subscribe(
        OperationCode::GetCaptured,
        Side::Client,
        |ctx: &mut ClientContext<P, V>, msg, _| {
            let NetMessage::GetCaptured(capture) = msg else { return };
            let result = ctx.state.on_get_captured(capture, &mut ctx.board);
            let event = remote_event(
                result,
                OperationCode::GetCaptured,
                ClientEvent::RemoteCaptureApplied(*capture),
            );
            ctx.push_event(event);
        },
    );

    dispatcher.subscribe(
        OperationCode::Rejected,
        Side::Client,
        |ctx: &mut ClientContext<P, V>, msg, _| {
            let NetMessage::Rejected(reason) = msg else { return };
            ctx.state.on_rejected(*reason);
            ctx.push_event(ClientEvent::Rejected(*reason));
        },
    );

    dispatcher.subscribe(
        OperationCode::KeepAlive,
        Side::Client,
        |ctx: &mut ClientContext<P, V>, _, _| ctx.reply(NetMessage::KeepAlive),
    );

    dispatcher
}

fn remote_event(
    result: Result<RemoteOutcome, SessionError>,
    code: OperationCode,
    applied: ClientEvent,
) -> ClientEvent {
    match result {
        Ok(RemoteOutcome::Applied) => applied,
        Ok(RemoteOutcome::EchoIgnored) => ClientEvent::EchoIgnored(code),
        Err(e) => {
            tracing::warn!(%code, error = %e, "skipping out-of-sync message");
            ClientEvent::Desync(e)
        }
    }
}
