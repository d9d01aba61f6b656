//! Per-connection tasks: a reader that forwards frames to the match actor
//! and a writer that drains the connection's outbound queue.
//!
//! Neither task looks inside a frame. Decoding, state changes and deciding
//! who gets what all happen in the match actor.

use std::sync::Arc;

use gambit_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

/// Something the match actor asks a connection's writer to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Outbound {
    /// Send an encoded frame.
    Frame(Vec<u8>),
    /// Close the connection after everything queued before this.
    Close,
}

/// What connection tasks report to the match actor.
#[derive(Debug)]
pub(crate) enum ServerEvent {
    /// A new connection; frames for it go into `outbound`.
    Connected {
        id: ConnectionId,
        outbound: mpsc::Sender<Outbound>,
    },
    /// One raw frame from a connection.
    Frame { id: ConnectionId, bytes: Vec<u8> },
    /// The connection is gone.
    Disconnected { id: ConnectionId },
}

/// Runs a connection from accept to close.
///
/// Spawns the writer, then reads until the peer goes away. Always reports
/// `Disconnected` on the way out.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    events: mpsc::Sender<ServerEvent>,
    outbound: mpsc::Receiver<Outbound>,
) {
    let id = conn.id();
    let conn = Arc::new(conn);
    tokio::spawn(write_loop(Arc::clone(&conn), outbound));

    loop {
        match conn.recv().await {
            Ok(Some(bytes)) => {
                if events.send(ServerEvent::Frame { id, bytes }).await.is_err() {
                    tracing::debug!(conn_id = %id, "match actor gone");
                    break;
                }
            }
            Ok(None) => {
                tracing::info!(conn_id = %id, "connection closed");
                break;
            }
            Err(e) => {
                tracing::debug!(conn_id = %id, error = %e, "recv error");
                break;
            }
        }
    }

    let _ = events.send(ServerEvent::Disconnected { id }).await;
}

/// Sends queued frames in order, then closes the connection once a
/// `Close` is reached or the match actor drops the queue.
async fn write_loop(conn: Arc<WebSocketConnection>, mut outbound: mpsc::Receiver<Outbound>) {
    let id = conn.id();
    while let Some(item) = outbound.recv().await {
        match item {
            Outbound::Frame(bytes) => {
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(conn_id = %id, error = %e, "send failed");
                    break;
                }
            }
            Outbound::Close => break,
        }
    }

    if let Err(e) = conn.close().await {
        tracing::debug!(conn_id = %id, error = %e, "close failed");
    }
}
