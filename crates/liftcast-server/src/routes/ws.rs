//! Live projection streams for displays.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
    routing::get,
    Router,
};

use liftcast_hub::Channel;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ws/platform/{platform}/status", get(status))
        .route("/ws/platform/{platform}/lifting-order", get(lifting_order))
}

async fn status(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, Channel::Status, platform))
}

async fn lifting_order(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(platform): Path<String>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, Channel::LiftingOrder, platform))
}

/// Forward frames until either side goes away, then drop the subscription.
async fn handle_socket(mut socket: WebSocket, state: AppState, channel: Channel, platform: String) {
    let mut subscription = state.hub.subscribe(channel, &platform);
    let id = subscription.id;
    tracing::info!(%platform, ?channel, %id, "Display connected");

    loop {
        tokio::select! {
            frame = subscription.frames.recv() => {
                let Some(frame) = frame else { break };
                if socket.send(Message::Text(frame.to_string().into())).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    // Displays only listen; pings are answered by axum.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    state.hub.unsubscribe(channel, &platform, id);
    tracing::info!(%platform, ?channel, %id, "Display disconnected");
}
