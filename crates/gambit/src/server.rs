//! `GambitServer` builder, accept loop and match actor.
//!
//! Every connection gets a reader task and a writer task (see
//! [`handler`](crate::handler)). All match state lives in one actor task
//! that handles one [`ServerEvent`] at a time, so the session needs no
//! locks.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use gambit_protocol::{
    BinaryCodec, Codec, ConnectionId, Dispatcher, NetMessage, OperationCode, Recipient,
    RejectReason, Side,
};
use gambit_session::{ServerSession, SessionError};
use gambit_transport::{Connection, Transport, WebSocketTransport};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval};

use crate::handler::{Outbound, ServerEvent, handle_connection};
use crate::{GambitError, ServerConfig};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring and starting a Gambit server.
///
/// # Example
///
/// ```rust,ignore
/// use gambit::prelude::*;
///
/// let server = GambitServer::builder()
///     .bind("0.0.0.0:7777")
///     .build()
///     .await?;
/// server.run().await
/// ```
#[derive(Debug, Clone, Default)]
pub struct GambitServerBuilder {
    config: ServerConfig,
}

impl GambitServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener using the binary wire codec.
    pub async fn build(self) -> Result<GambitServer<BinaryCodec>, GambitError> {
        self.build_with_codec(BinaryCodec).await
    }

    /// Binds the listener using a custom codec.
    pub async fn build_with_codec<C: Codec>(
        self,
        codec: C,
    ) -> Result<GambitServer<C>, GambitError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr)
            .await?
            .with_handshake_timeout(Duration::from_secs(self.config.handshake_timeout_secs.max(1)));
        Ok(GambitServer {
            transport,
            codec,
            config: self.config,
        })
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// A bound Gambit match server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GambitServer<C: Codec = BinaryCodec> {
    transport: WebSocketTransport,
    codec: C,
    config: ServerConfig,
}

impl GambitServer {
    /// Creates a new builder.
    pub fn builder() -> GambitServerBuilder {
        GambitServerBuilder::new()
    }
}

impl<C: Codec> GambitServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop. Only returns if the match actor stops.
    pub async fn run(mut self) -> Result<(), GambitError> {
        let (events_tx, events_rx) = mpsc::channel(self.config.event_channel_size.max(1));
        let actor = MatchActor::new(self.codec, &self.config);
        tokio::spawn(actor.run(events_rx));

        tracing::info!(addr = ?self.transport.local_addr().ok(), "gambit server listening");

        loop {
            let conn = match self.transport.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                    continue;
                }
            };

            let id = conn.id();
            let (outbound_tx, outbound_rx) = mpsc::channel(self.config.outbound_queue_size.max(1));
            let connected = ServerEvent::Connected {
                id,
                outbound: outbound_tx,
            };
            // Registered before the reader starts, so its frames always
            // arrive after it.
            if events_tx.send(connected).await.is_err() {
                tracing::error!("match actor stopped");
                return Ok(());
            }

            tracing::info!(conn_id = %id, "connection accepted");
            tokio::spawn(handle_connection(conn, events_tx.clone(), outbound_rx));
        }
    }
}

// ---------------------------------------------------------------------------
// Match actor
// ---------------------------------------------------------------------------

/// What server-side handlers can touch.
pub(crate) struct ServerContext {
    session: ServerSession,
    outbox: Vec<(Recipient, NetMessage)>,
    closing: Vec<ConnectionId>,
}

impl ServerContext {
    fn new() -> Self {
        Self {
            session: ServerSession::new(),
            outbox: Vec::new(),
            closing: Vec::new(),
        }
    }
}

/// Owns the session and every connection's outbound queue.
struct MatchActor<C> {
    codec: C,
    dispatcher: Dispatcher<ServerContext>,
    ctx: ServerContext,
    connections: HashMap<ConnectionId, mpsc::Sender<Outbound>>,
    keep_alive: Option<Interval>,
}

impl<C: Codec> MatchActor<C> {
    fn new(codec: C, config: &ServerConfig) -> Self {
        let keep_alive = config
            .keep_alive_interval()
            .map(|period| tokio::time::interval_at(Instant::now() + period, period));

        Self {
            codec,
            dispatcher: server_dispatcher(),
            ctx: ServerContext::new(),
            connections: HashMap::new(),
            keep_alive,
        }
    }

    async fn run(mut self, mut events: mpsc::Receiver<ServerEvent>) {
        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                _ = tick(&mut self.keep_alive) => {
                    self.ctx.outbox.push((Recipient::All, NetMessage::KeepAlive));
                    self.flush();
                }
            }
        }
        tracing::debug!("match actor stopped");
    }

    fn handle_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::Connected { id, outbound } => {
                self.connections.insert(id, outbound);
            }
            ServerEvent::Frame { id, bytes } => {
                let msg = match self.codec.decode(&bytes) {
                    Ok(msg) => msg,
                    Err(e) => {
                        tracing::warn!(conn_id = %id, error = %e, "dropping undecodable frame");
                        return;
                    }
                };

                let ran = self
                    .dispatcher
                    .publish(Side::Server, &mut self.ctx, &msg, Some(id));
                if ran == 0 {
                    tracing::debug!(conn_id = %id, code = %msg.code(), "no handler for message");
                }
                self.flush();
            }
            ServerEvent::Disconnected { id } => {
                // The seat stays taken; only the queue goes.
                if self.connections.remove(&id).is_some() {
                    tracing::info!(conn_id = %id, "connection forgotten");
                }
            }
        }
    }

    /// Encodes and delivers everything the handlers queued, then closes
    /// any connection they asked to drop.
    ///
    /// A connection whose queue is full is dropped on the spot. Its writer
    /// drains what's left and closes the socket.
    fn flush(&mut self) {
        for (recipient, msg) in std::mem::take(&mut self.ctx.outbox) {
            let bytes = match self.codec.encode(&msg) {
                Ok(bytes) => bytes,
                Err(e) => {
                    tracing::error!(code = %msg.code(), error = %e, "encode failed");
                    continue;
                }
            };

            let targets: Vec<ConnectionId> = match recipient {
                Recipient::All => self.connections.keys().copied().collect(),
                Recipient::Connection(id) => vec![id],
            };
            for id in targets {
                self.deliver(id, Outbound::Frame(bytes.clone()));
            }
        }

        for id in std::mem::take(&mut self.ctx.closing) {
            if let Some(tx) = self.connections.remove(&id) {
                // A full queue closes on its own once the sender is gone.
                let _ = tx.try_send(Outbound::Close);
            }
        }
    }

    fn deliver(&mut self, id: ConnectionId, item: Outbound) {
        let Some(tx) = self.connections.get(&id) else {
            return;
        };
        match tx.try_send(item) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn_id = %id, "outbound queue full, dropping connection");
                self.connections.remove(&id);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.connections.remove(&id);
            }
        }
    }
}

/// Waits for the next keep-alive tick, or forever when disabled.
async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

/// The server's handlers: seat assignment, relays and keep-alive replies.
fn server_dispatcher() -> Dispatcher<ServerContext> {
    let mut dispatcher = Dispatcher::<ServerContext>::new();

    dispatcher.subscribe(OperationCode::Welcome, Side::Server, |ctx, _msg, origin| {
        let Some(origin) = origin else {
            tracing::warn!("welcome without an origin connection");
            return;
        };
        match ctx.session.on_welcome(origin) {
            Ok(out) => ctx.outbox.extend(out),
            Err(e @ SessionError::Capacity { .. }) => {
                tracing::warn!(conn_id = %origin, error = %e, "rejecting connection");
                ctx.outbox.push((
                    Recipient::Connection(origin),
                    NetMessage::Rejected(RejectReason::MatchFull),
                ));
                ctx.closing.push(origin);
            }
            Err(e) => tracing::warn!(conn_id = %origin, error = %e, "welcome failed"),
        }
    });

    for code in [OperationCode::MakeMove, OperationCode::GetCaptured] {
        dispatcher.subscribe(code, Side::Server, |ctx, msg, _origin| {
            let out = ctx.session.relay(*msg);
            ctx.outbox.extend(out);
        });
    }

    dispatcher.subscribe(OperationCode::KeepAlive, Side::Server, |_ctx, _msg, origin| {
        if let Some(origin) = origin {
            tracing::trace!(conn_id = %origin, "keep-alive reply");
        }
    });

    dispatcher
}
