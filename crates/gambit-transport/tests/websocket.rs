//! Integration tests for the WebSocket transport.
//!
//! These tests spin up a real listener on an OS-assigned port and talk to
//! it with both a raw tungstenite client and the transport's own
//! `connect`, checking that frames flow both ways.

#[cfg(feature = "websocket")]
mod websocket {
    use std::sync::Arc;
    use std::time::Duration;

    use futures_util::{SinkExt, StreamExt};
    use gambit_transport::{Connection, Transport, WebSocketTransport};
    use tokio_tungstenite::tungstenite::Message;

    async fn bind() -> (WebSocketTransport, String) {
        let transport = WebSocketTransport::bind("127.0.0.1:0")
            .await
            .expect("should bind");
        let addr = transport
            .local_addr()
            .expect("should have local addr")
            .to_string();
        (transport, addr)
    }

    #[tokio::test]
    async fn test_websocket_accept_and_send_receive() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (mut client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .expect("client should connect");

        let server_conn = server_handle.await.expect("task should complete");
        assert!(server_conn.id().into_inner() > 0);

        // --- Server sends, client receives ---
        server_conn
            .send(&[2, 1, 0, 0, 0, 1])
            .await
            .expect("send should succeed");

        let msg = client_ws.next().await.unwrap().unwrap();
        assert_eq!(msg.into_data().as_ref(), &[2, 1, 0, 0, 0, 1]);

        // --- Client sends, server receives ---
        client_ws
            .send(Message::Binary(vec![3u8].into()))
            .await
            .unwrap();

        let received = server_conn
            .recv()
            .await
            .expect("recv should succeed")
            .expect("should have data");
        assert_eq!(received, vec![3u8]);

        server_conn.close().await.expect("close should succeed");
    }

    #[tokio::test]
    async fn test_websocket_recv_returns_none_on_client_close() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let (mut client_ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}"))
                .await
                .unwrap();
        let server_conn = server_handle.await.unwrap();

        client_ws.send(Message::Close(None)).await.unwrap();

        let result = server_conn.recv().await.expect("recv should not error");
        assert!(result.is_none(), "should return None on client close");
    }

    #[tokio::test]
    async fn test_connect_pairs_with_accept() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let client = WebSocketTransport::connect(&addr)
            .await
            .expect("should connect");
        let server = server_handle.await.unwrap();
        assert_ne!(client.id(), server.id());

        client.send(&[1]).await.unwrap();
        assert_eq!(server.recv().await.unwrap(), Some(vec![1]));
    }

    #[tokio::test]
    async fn test_send_is_not_blocked_by_pending_recv() {
        let (mut transport, addr) = bind().await;

        let server_handle = tokio::spawn(async move {
            transport.accept().await.expect("should accept")
        });

        let client = WebSocketTransport::connect(&addr).await.unwrap();
        let server = Arc::new(server_handle.await.unwrap());

        // Park a reader on the server side; nothing will arrive for it.
        let reader = Arc::clone(&server);
        let pending = tokio::spawn(async move { reader.recv().await });

        tokio::time::timeout(Duration::from_secs(2), server.send(&[3]))
            .await
            .expect("send must not wait for the parked reader")
            .unwrap();
        assert_eq!(client.recv().await.unwrap(), Some(vec![3]));

        pending.abort();
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let (transport, addr) = bind().await;
        drop(transport);

        let result = WebSocketTransport::connect(&addr).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stalled_handshake_does_not_block_next_accept() {
        let (transport, addr) = bind().await;
        let mut transport = transport.with_handshake_timeout(Duration::from_millis(200));

        // Opens TCP but never speaks WebSocket.
        let _silent = tokio::net::TcpStream::connect(&addr).await.unwrap();
        let first = tokio::time::timeout(Duration::from_secs(2), transport.accept())
            .await
            .expect("accept should give up on the stalled peer");
        assert!(first.is_err());

        let server_handle = tokio::spawn(async move { transport.accept().await });
        let _client = WebSocketTransport::connect(&addr).await.unwrap();
        let accepted = tokio::time::timeout(Duration::from_secs(2), server_handle)
            .await
            .expect("second accept should not hang")
            .unwrap();
        assert!(accepted.is_ok());
    }
}
