//! Integration tests for the WebSocket gateway.
//!
//! Spins up a real server on a random port and drives it with
//! tokio-tungstenite clients: the hello handshake, command round-trips,
//! unknown-command errors, plain-chat silence, and per-connection user
//! isolation.
//!
//! Verification command: `cargo test --test gateway_session`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite;

use todobot_core::snapshot::MemoryStorage;
use todobot_core::store::TaskStore;
use todobot_gateway::server::{ClientFrame, GatewayState, ServerFrame, start_server};

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// Starts a gateway with an in-memory store and prefix `-` on a random
/// port.
async fn start_gateway() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let store = TaskStore::open(Box::new(MemoryStorage::new())).unwrap();
    let state = Arc::new(GatewayState::new(store, "-"));
    start_server("127.0.0.1:0", state)
        .await
        .expect("failed to start test gateway")
}

/// Connects a WebSocket client without identifying.
async fn connect(addr: SocketAddr) -> WsStream {
    let url = format!("ws://{addr}/ws");
    let (ws, _) = tokio_tungstenite::connect_async(&url).await.unwrap();
    ws
}

/// Connects and completes the hello handshake for `user_id`.
async fn connect_and_hello(addr: SocketAddr, user_id: &str) -> WsStream {
    let mut ws = connect(addr).await;
    send_frame(
        &mut ws,
        &ClientFrame::Hello {
            user_id: user_id.to_string(),
        },
    )
    .await;

    let ready = recv_frame(&mut ws).await;
    assert_eq!(
        ready,
        ServerFrame::Ready {
            user_id: user_id.to_string()
        }
    );
    ws
}

async fn send_frame(ws: &mut WsStream, frame: &ClientFrame) {
    let json = serde_json::to_string(frame).unwrap();
    ws.send(tungstenite::Message::Text(json.into()))
        .await
        .unwrap();
}

/// Sends one chat line as a command frame.
async fn send_line(ws: &mut WsStream, line: &str) {
    send_frame(
        ws,
        &ClientFrame::Command {
            line: line.to_string(),
        },
    )
    .await;
}

/// Receives and decodes the next server frame.
async fn recv_frame(ws: &mut WsStream) -> ServerFrame {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("recv timed out")
        .unwrap()
        .unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

/// Unwraps a reply frame, panicking on anything else.
fn unwrap_reply(frame: ServerFrame) -> todobot_gateway::render::Reply {
    match frame {
        ServerFrame::Reply { reply } => reply,
        other => panic!("expected Reply, got {other:?}"),
    }
}

#[tokio::test]
async fn hello_handshake_then_command() {
    let (addr, _handle) = start_gateway().await;
    let mut ws = connect_and_hello(addr, "alice").await;

    send_line(&mut ws, "-add Buy milk").await;
    let reply = unwrap_reply(recv_frame(&mut ws).await);
    assert_eq!(reply.title, "Task Added");
    assert!(reply.body.contains("Buy milk"));
}

#[tokio::test]
async fn full_session_round_trip() {
    let (addr, _handle) = start_gateway().await;
    let mut ws = connect_and_hello(addr, "alice").await;

    send_line(&mut ws, "-add Buy milk").await;
    let _ = recv_frame(&mut ws).await;
    send_line(&mut ws, "-add Walk the dog").await;
    let _ = recv_frame(&mut ws).await;

    send_line(&mut ws, "-check 1").await;
    let reply = unwrap_reply(recv_frame(&mut ws).await);
    assert_eq!(reply.title, "Task Completed!");
    assert!(reply.body.contains("~~Buy milk~~"));

    send_line(&mut ws, "-list").await;
    let reply = unwrap_reply(recv_frame(&mut ws).await);
    assert_eq!(reply.title, "alice's To-Do List");
    assert!(reply.body.contains("~~Buy milk~~"));
    assert!(reply.body.contains("Walk the dog"));
    assert!(reply.body.contains("1/2 tasks completed"));

    send_line(&mut ws, "-stats").await;
    let reply = unwrap_reply(recv_frame(&mut ws).await);
    assert!(reply.body.contains("Total Tasks: 2"));
    assert!(reply.body.contains("Completion Rate: 50.0%"));
}

#[tokio::test]
async fn unknown_command_returns_error_frame() {
    let (addr, _handle) = start_gateway().await;
    let mut ws = connect_and_hello(addr, "alice").await;

    send_line(&mut ws, "-frobnicate").await;
    match recv_frame(&mut ws).await {
        ServerFrame::Error { reason } => {
            assert!(reason.contains("frobnicate"), "reason was: {reason}");
            assert!(reason.contains("-help"), "reason was: {reason}");
        }
        other => panic!("expected Error, got {other:?}"),
    }
}

#[tokio::test]
async fn plain_chat_gets_no_reply() {
    let (addr, _handle) = start_gateway().await;
    let mut ws = connect_and_hello(addr, "alice").await;

    // Ordinary chat, even chat that mentions command names, is silent.
    send_line(&mut ws, "remind me to add milk to the list").await;
    // Prove silence by sending a real command and checking the very
    // next frame answers it.
    send_line(&mut ws, "-help").await;
    let reply = unwrap_reply(recv_frame(&mut ws).await);
    assert_eq!(reply.title, "To-Do List Commands");
}

#[tokio::test]
async fn command_failures_come_back_as_replies() {
    let (addr, _handle) = start_gateway().await;
    let mut ws = connect_and_hello(addr, "alice").await;

    send_line(&mut ws, "-check 1").await;
    let reply = unwrap_reply(recv_frame(&mut ws).await);
    assert_eq!(reply.title, "Empty List");

    send_line(&mut ws, "-add only").await;
    let _ = recv_frame(&mut ws).await;
    send_line(&mut ws, "-check 5").await;
    let reply = unwrap_reply(recv_frame(&mut ws).await);
    assert!(reply.body.contains("between 1 and 1"));
}

#[tokio::test]
async fn connections_are_bound_to_their_own_user() {
    let (addr, _handle) = start_gateway().await;
    let mut ws_alice = connect_and_hello(addr, "alice").await;
    let mut ws_bob = connect_and_hello(addr, "bob").await;

    send_line(&mut ws_alice, "-add alice task").await;
    let _ = recv_frame(&mut ws_alice).await;

    // Bob's list is untouched by Alice's command.
    send_line(&mut ws_bob, "-list").await;
    let reply = unwrap_reply(recv_frame(&mut ws_bob).await);
    assert!(reply.body.contains("empty"));

    // But both see the same shared store: reconnecting as alice finds
    // the task again.
    let mut ws_alice2 = connect_and_hello(addr, "alice").await;
    send_line(&mut ws_alice2, "-list").await;
    let reply = unwrap_reply(recv_frame(&mut ws_alice2).await);
    assert!(reply.body.contains("alice task"));
}

#[tokio::test]
async fn second_hello_is_rejected() {
    let (addr, _handle) = start_gateway().await;
    let mut ws = connect_and_hello(addr, "alice").await;

    send_frame(
        &mut ws,
        &ClientFrame::Hello {
            user_id: "mallory".to_string(),
        },
    )
    .await;
    match recv_frame(&mut ws).await {
        ServerFrame::Error { reason } => assert!(reason.contains("already identified")),
        other => panic!("expected Error, got {other:?}"),
    }

    // The connection still acts for the original user.
    send_line(&mut ws, "-add still alice").await;
    let reply = unwrap_reply(recv_frame(&mut ws).await);
    assert_eq!(reply.title, "Task Added");
}

#[tokio::test]
async fn command_before_hello_closes_connection() {
    let (addr, _handle) = start_gateway().await;
    let mut ws = connect(addr).await;

    send_line(&mut ws, "-add too eager").await;

    // The server drops the unidentified connection instead of serving it.
    let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("recv timed out");
    match next {
        None | Some(Ok(tungstenite::Message::Close(_))) | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("expected close, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_frame_reports_error() {
    let (addr, _handle) = start_gateway().await;
    let mut ws = connect_and_hello(addr, "alice").await;

    ws.send(tungstenite::Message::Text("{\"type\":\"bogus\"}".into()))
        .await
        .unwrap();
    match recv_frame(&mut ws).await {
        ServerFrame::Error { reason } => assert!(reason.contains("malformed")),
        other => panic!("expected Error, got {other:?}"),
    }
}
