use crate::transport;
use anyhow::Context;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

const HTTP_ADDR: &str = "0.0.0.0:8080";
const BROADCAST_CAPACITY: usize = 64;
const PLACEHOLDER_SNAPSHOT: &str = "no snapshot received yet\n";

/// FanoutState is the shared state the HTTP/ws handlers read and the
/// snapshot receive thread writes: the latest rendered snapshot behind a
/// plain mutex, and a broadcast channel fanning each new one out to
/// connected websocket clients.
struct FanoutState {
    latest: Mutex<Option<String>>,
    publisher: broadcast::Sender<String>,
}

/// Runs the market-data fanout: subscribes to the engine's snapshot PUB
/// socket on a dedicated thread and serves the latest snapshot over HTTP
/// and a websocket broadcast. The engine never talks to clients directly;
/// this role owns the subscriber socket alone.
pub async fn run(snapshot_source_addr: &str) -> anyhow::Result<()> {
    let (publisher, _rx) = broadcast::channel(BROADCAST_CAPACITY);
    let state = Arc::new(FanoutState {
        latest: Mutex::new(None),
        publisher,
    });

    let ctx = zmq::Context::new();
    let sub = transport::connect_snapshot_sub(&ctx, snapshot_source_addr)?;
    let receiver_state = state.clone();
    std::thread::spawn(move || receive_loop(sub, receiver_state));

    let app = Router::new()
        .route("/", get(health))
        .route("/ws", get(ws_upgrade))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(HTTP_ADDR)
        .await
        .with_context(|| format!("binding HTTP listener on {HTTP_ADDR}"))?;
    tracing::info!(addr = HTTP_ADDR, "market-data fanout listening");
    axum::serve(listener, app)
        .await
        .context("serving market-data fanout")?;
    Ok(())
}

/// Blocks on the snapshot SUB socket, updating the shared buffer and
/// broadcasting to websocket clients best-effort; a lagging or absent
/// subscriber never holds this thread up.
fn receive_loop(sub: zmq::Socket, state: Arc<FanoutState>) {
    loop {
        match sub.recv_bytes(0) {
            Ok(bytes) => match String::from_utf8(bytes) {
                Ok(snapshot) => {
                    *state.latest.lock().expect("fanout snapshot mutex poisoned") =
                        Some(snapshot.clone());
                    // No subscribers is not an error: clients are best-effort.
                    let _ = state.publisher.send(snapshot);
                }
                Err(err) => tracing::warn!(%err, "dropping non-utf8 snapshot"),
            },
            Err(err) => tracing::error!(%err, "snapshot socket recv failed"),
        }
    }
}

async fn health(State(state): State<Arc<FanoutState>>) -> Response {
    match state.latest.lock() {
        Ok(guard) => {
            let body = guard.clone().unwrap_or_else(|| PLACEHOLDER_SNAPSHOT.to_string());
            (StatusCode::OK, body).into_response()
        }
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response(),
    }
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<FanoutState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<FanoutState>) {
    let mut updates = state.publisher.subscribe();

    let initial = state.latest.lock().ok().and_then(|guard| guard.clone());
    if let Some(snapshot) = initial {
        if socket.send(Message::Text(snapshot)).await.is_err() {
            return;
        }
    }

    loop {
        match updates.recv().await {
            Ok(snapshot) => {
                if socket.send(Message::Text(snapshot)).await.is_err() {
                    break;
                }
            }
            // A slow client missed some snapshots; history is not
            // retained, so it just picks up from the next one.
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
