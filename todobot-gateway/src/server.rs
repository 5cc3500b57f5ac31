//! Gateway server core: shared state, WebSocket handler, and the
//! chat-line front door for the command processor.
//!
//! Each WebSocket connection belongs to exactly one user: the first
//! frame must be a `hello` carrying the user id, and every command on
//! that connection runs against that user's list (the id is enforced
//! server-side, so one client can never address another user's tasks).
//! Frames are handled to completion in arrival order, which gives the
//! per-user ordering guarantee; a single lock around the store
//! serializes access across connections.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use todobot_core::command::{self, Command};
use todobot_core::store::TaskStore;
use todobot_core::user::UserId;

use crate::render::{self, Reply};

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Identifies the connection. Must be the first frame.
    Hello {
        /// Stable identity of the user behind this connection.
        user_id: String,
    },
    /// One inbound chat line, possibly a prefixed command.
    Command {
        /// The raw chat line.
        line: String,
    },
}

/// Frames the server sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// Acknowledges a `hello`.
    Ready {
        /// The user id this connection is bound to.
        user_id: String,
    },
    /// Rendered outcome of a command.
    Reply {
        /// The reply to display.
        reply: Reply,
    },
    /// A protocol-level problem (malformed frame, unknown command).
    Error {
        /// Human-readable description.
        reason: String,
    },
}

/// What the gateway should do with one inbound chat line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Not a command (no prefix): ordinary chat, no reply.
    Ignored,
    /// Prefixed, but the name is outside the command set.
    Unknown {
        /// The unrecognized command name.
        name: String,
    },
    /// A command ran; send this reply back.
    Reply(Reply),
}

/// Shared gateway state: the task store behind a single lock, plus the
/// configured command prefix.
pub struct GatewayState {
    store: Mutex<TaskStore>,
    prefix: String,
}

impl GatewayState {
    /// Creates gateway state around an opened store.
    pub fn new(store: TaskStore, prefix: impl Into<String>) -> Self {
        Self {
            store: Mutex::new(store),
            prefix: prefix.into(),
        }
    }

    /// The configured command prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Handles one inbound chat line for `user`.
    ///
    /// Lines without the prefix are ordinary chat and produce no reply.
    /// The store lock is held for the duration of exactly one command,
    /// covering both the in-memory mutation and the snapshot write.
    pub fn handle_line(&self, user: &UserId, line: &str) -> LineOutcome {
        let Some(rest) = line.strip_prefix(&self.prefix) else {
            return LineOutcome::Ignored;
        };
        let (name, args) = match rest.split_once(char::is_whitespace) {
            Some((name, args)) => (name, args),
            None => (rest, ""),
        };
        if name.is_empty() {
            return LineOutcome::Ignored;
        }
        let Some(cmd) = Command::parse(name) else {
            return LineOutcome::Unknown {
                name: name.to_string(),
            };
        };

        let outcome = {
            let mut store = self.store.lock();
            command::dispatch(&mut store, user, cmd, args)
        };
        tracing::info!(user = %user, command = name, "command handled");
        LineOutcome::Reply(render::render(user, &self.prefix, &outcome))
    }
}

/// Starts the gateway server, returning the bound address and the
/// serve task handle.
///
/// # Errors
///
/// Returns an I/O error if the listener cannot be bound.
pub async fn start_server(
    addr: &str,
    state: Arc<GatewayState>,
) -> io::Result<(SocketAddr, JoinHandle<()>)> {
    let app = axum::Router::new()
        .route("/ws", axum::routing::get(ws_handler))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "gateway server error");
        }
    });

    Ok((bound_addr, handle))
}

/// axum handler that upgrades an HTTP request to a WebSocket
/// connection.
async fn ws_handler(
    ws: axum::extract::ws::WebSocketUpgrade,
    axum::extract::State(state): axum::extract::State<Arc<GatewayState>>,
) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles an upgraded WebSocket connection for a single user.
///
/// The connection lifecycle:
/// 1. Wait for a `hello` frame carrying the user id.
/// 2. Send `ready` back.
/// 3. Enter the command loop: each `command` frame is run to
///    completion and answered (or silently ignored as plain chat)
///    before the next frame is read.
async fn handle_socket(mut socket: WebSocket, state: Arc<GatewayState>) {
    let Some(user) = wait_for_hello(&mut socket).await else {
        tracing::warn!("connection closed before hello");
        return;
    };

    tracing::info!(user = %user, "user connected");

    let ready = ServerFrame::Ready {
        user_id: user.to_string(),
    };
    if send_frame(&mut socket, &ready).await.is_err() {
        tracing::warn!(user = %user, "failed to send ready frame");
        return;
    }

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(raw) => {
                let response = match serde_json::from_str::<ClientFrame>(raw.as_str()) {
                    Ok(ClientFrame::Command { line }) => match state.handle_line(&user, &line) {
                        LineOutcome::Ignored => None,
                        LineOutcome::Unknown { name } => Some(ServerFrame::Error {
                            reason: format!(
                                "unknown command `{name}`; try `{}help`",
                                state.prefix()
                            ),
                        }),
                        LineOutcome::Reply(reply) => Some(ServerFrame::Reply { reply }),
                    },
                    Ok(ClientFrame::Hello { .. }) => Some(ServerFrame::Error {
                        reason: "already identified".to_string(),
                    }),
                    Err(e) => {
                        tracing::warn!(user = %user, error = %e, "malformed frame");
                        Some(ServerFrame::Error {
                            reason: format!("malformed frame: {e}"),
                        })
                    }
                };
                if let Some(frame) = response {
                    if send_frame(&mut socket, &frame).await.is_err() {
                        tracing::warn!(user = %user, "WebSocket write failed");
                        break;
                    }
                }
            }
            Message::Close(_) => {
                tracing::info!(user = %user, "received close frame");
                break;
            }
            _ => {
                // Ignore binary, ping, pong frames.
            }
        }
    }

    tracing::info!(user = %user, "user disconnected");
}

/// Waits for the first frame, expecting a `hello`.
///
/// Returns the user id if a valid `hello` is received, or `None` if
/// the connection closes or a different frame arrives first.
async fn wait_for_hello(socket: &mut WebSocket) -> Option<UserId> {
    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(raw) => match serde_json::from_str::<ClientFrame>(raw.as_str()) {
                Ok(ClientFrame::Hello { user_id }) => {
                    if user_id.is_empty() {
                        tracing::warn!("received hello with empty user id");
                        return None;
                    }
                    return Some(UserId::new(user_id));
                }
                Ok(other) => {
                    tracing::warn!(frame = ?other, "expected hello, got different frame");
                    return None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to decode hello frame");
                    return None;
                }
            },
            Message::Close(_) => return None,
            _ => {
                // Skip non-text frames (ping/pong) before identification.
            }
        }
    }
    None
}

/// Serializes and sends one server frame.
async fn send_frame(socket: &mut WebSocket, frame: &ServerFrame) -> Result<(), axum::Error> {
    let json = serde_json::to_string(frame).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}
