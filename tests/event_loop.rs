mod common;

use common::{MockNode, BOT_ID, PASSWORD, TIMEOUT};
use lava::error::Error;
use lava::protocol::events::{ReadyEvent, StatsEvent, TrackStartEvent};
use lava::{ConnectionStatus, Lavalink};
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

async fn wait_terminal(mut status: watch::Receiver<ConnectionStatus>) -> ConnectionStatus {
    let terminal = timeout(TIMEOUT, status.wait_for(ConnectionStatus::is_terminal))
        .await
        .expect("event loop did not stop")
        .expect("status sender dropped")
        .clone();
    terminal
}

fn forward<E: lava::EventType>(lavalink: &Lavalink) -> mpsc::UnboundedReceiver<E> {
    let (tx, rx) = mpsc::unbounded_channel();
    lavalink.listen(move |event: E| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(event);
            Ok(())
        }
    });
    rx
}

#[tokio::test]
async fn test_handshake_url_and_headers() {
    let mut node = MockNode::start().await;
    let mut lavalink = Lavalink::new();

    lavalink
        .connect(node.config().with_resume_key("resume-me"))
        .await
        .unwrap();
    let conn = node.accept().await;

    assert_eq!(conn.path, "/v3/websocket");
    assert_eq!(conn.header("Authorization"), Some(PASSWORD));
    assert_eq!(conn.header("User-Id"), Some(BOT_ID.to_string().as_str()));
    assert!(conn.header("Client-Name").unwrap().starts_with("lava-rs/"));
    assert_eq!(conn.header("Resume-Key"), Some("resume-me"));

    assert_eq!(lavalink.host().unwrap(), "127.0.0.1");
    assert_eq!(lavalink.port().unwrap(), node.addr.port());
    assert!(!lavalink.is_ssl().unwrap());
    assert_eq!(
        lavalink.websocket().unwrap().url(),
        format!("ws://127.0.0.1:{}/v3/websocket", node.addr.port())
    );
    assert_eq!(lavalink.status().unwrap(), ConnectionStatus::Open);
}

#[tokio::test]
async fn test_resume_key_header_absent_by_default() {
    let mut node = MockNode::start().await;
    let mut lavalink = Lavalink::new();

    lavalink.connect(node.config()).await.unwrap();
    let conn = node.accept().await;

    assert_eq!(conn.header("Resume-Key"), None);
}

#[tokio::test]
async fn test_frames_are_routed_to_matching_listeners() {
    let mut node = MockNode::start().await;
    let mut lavalink = Lavalink::new();
    let mut ready = forward::<ReadyEvent>(&lavalink);
    let mut stats = forward::<StatsEvent>(&lavalink);
    let mut starts = forward::<TrackStartEvent>(&lavalink);

    lavalink.connect(node.config()).await.unwrap();
    let conn = node.accept().await;

    conn.send_json(common::ready_frame("session-1"));
    conn.send_json(common::stats_frame());
    conn.send_json(common::track_start_frame("42"));

    let event = timeout(TIMEOUT, ready.recv()).await.unwrap().unwrap();
    assert_eq!(event.session_id, "session-1");

    let event = timeout(TIMEOUT, stats.recv()).await.unwrap().unwrap();
    assert_eq!(event.playing_players, 1);
    assert_eq!(event.frame_stats.unwrap().deficit, -3010);

    let event = timeout(TIMEOUT, starts.recv()).await.unwrap().unwrap();
    assert_eq!(event.guild_id, 42);

    assert!(ready.try_recv().is_err());
    assert!(starts.try_recv().is_err());
}

#[tokio::test]
async fn test_unknown_frames_are_skipped() {
    let mut node = MockNode::start().await;
    let mut lavalink = Lavalink::new();
    let mut ready = forward::<ReadyEvent>(&lavalink);
    let mut starts = forward::<TrackStartEvent>(&lavalink);

    lavalink.connect(node.config()).await.unwrap();
    let conn = node.accept().await;

    conn.send_json(json!({"op": "event", "type": "SegmentSkipped", "guildId": "1"}));
    conn.send_json(json!({"op": "somethingNew"}));
    conn.send_json(common::ready_frame("after-unknown"));

    // Frames are handled in order, so the ready frame arriving proves the unknown ones were passed over
    let event = timeout(TIMEOUT, ready.recv()).await.unwrap().unwrap();
    assert_eq!(event.session_id, "after-unknown");
    assert!(starts.try_recv().is_err());
    assert_eq!(lavalink.status().unwrap(), ConnectionStatus::Open);
}

#[tokio::test]
async fn test_malformed_frame_stops_loop_with_error() {
    let mut node = MockNode::start().await;
    let mut lavalink = Lavalink::new();

    lavalink.connect(node.config()).await.unwrap();
    let conn = node.accept().await;
    let status = lavalink.subscribe_status().unwrap();

    conn.send_raw("{not json");

    match wait_terminal(status).await {
        ConnectionStatus::Errored(reason) => assert!(reason.contains("malformed frame")),
        other => panic!("Expected Errored, got {other:?}"),
    }
}

#[tokio::test]
async fn test_node_close_reports_closed() {
    let mut node = MockNode::start().await;
    let mut lavalink = Lavalink::new();

    lavalink.connect(node.config()).await.unwrap();
    let conn = node.accept().await;
    let status = lavalink.subscribe_status().unwrap();

    conn.close();

    assert_eq!(wait_terminal(status).await, ConnectionStatus::Closed);
}

#[tokio::test]
async fn test_close_sends_close_frame_and_resets_state() {
    let mut node = MockNode::start().await;
    let mut lavalink = Lavalink::new();

    lavalink.connect(node.config()).await.unwrap();
    let mut conn = node.accept().await;
    let status = lavalink.subscribe_status().unwrap();

    lavalink.close().await.unwrap();
    conn.client_closed().await;

    assert_eq!(*status.borrow(), ConnectionStatus::Closed);
    assert!(matches!(lavalink.host(), Err(Error::NotConnected)));
    assert!(matches!(lavalink.close().await, Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_reconnect_closes_previous_session() {
    let mut node = MockNode::start().await;
    let mut lavalink = Lavalink::new();
    let mut ready = forward::<ReadyEvent>(&lavalink);

    lavalink.connect(node.config()).await.unwrap();
    let mut first = node.accept().await;
    let first_status = lavalink.subscribe_status().unwrap();

    lavalink.connect(node.config()).await.unwrap();
    let second = node.accept().await;

    first.client_closed().await;
    assert_eq!(*first_status.borrow(), ConnectionStatus::Closed);

    // Listeners registered before the first connect still fire on the new session
    second.send_json(common::ready_frame("second"));
    let event = timeout(TIMEOUT, ready.recv()).await.unwrap().unwrap();
    assert_eq!(event.session_id, "second");
}

#[tokio::test]
async fn test_connect_failure_leaves_client_unconnected() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let config = lava::ConnectionConfig::new("127.0.0.1", port, PASSWORD, BOT_ID);
    let mut lavalink = Lavalink::new();

    assert!(matches!(lavalink.connect(config).await, Err(Error::Connection(_))));
    assert!(matches!(lavalink.websocket(), Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_socket_error_stops_loop_with_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (dropped_tx, dropped_rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
        // Drop the TCP stream without a close frame
        drop(ws);
        let _ = dropped_tx.send(());
    });

    let mut lavalink = Lavalink::new();
    lavalink
        .connect(lava::ConnectionConfig::new("127.0.0.1", port, PASSWORD, BOT_ID))
        .await
        .unwrap();
    let status = lavalink.subscribe_status().unwrap();
    timeout(TIMEOUT, dropped_rx).await.unwrap().unwrap();

    match wait_terminal(status).await {
        ConnectionStatus::Errored(reason) => assert!(reason.starts_with("WebSocket error:")),
        other => panic!("Expected Errored, got {other:?}"),
    }
}

#[tokio::test]
async fn test_connect_times_out_on_stalled_handshake() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    // Accept the TCP connection but never answer the upgrade request
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        tokio::time::sleep(TIMEOUT).await;
        drop(stream);
    });

    let config = lava::ConnectionConfig::new("127.0.0.1", port, PASSWORD, BOT_ID)
        .with_request_timeout(std::time::Duration::from_millis(100));
    let mut lavalink = Lavalink::new();

    let result = timeout(TIMEOUT, lavalink.connect(config)).await.unwrap();
    match result {
        Err(Error::Connection(message)) => assert!(message.contains("timed out")),
        other => panic!("Expected Connection error, got {other:?}"),
    }
    assert!(matches!(lavalink.websocket(), Err(Error::NotConnected)));
    server.abort();
}
