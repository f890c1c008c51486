use axum::{
    Router,
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};

use crate::{
    error::AppError,
    services::{room_service, websocket_service},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/rooms/{code}/ws",
    tag = "rooms",
    params(("code" = String, Path, description = "Six-digit room code")),
    responses(
        (status = 101, description = "Switching protocols to WebSocket"),
        (status = 404, description = "Room not found")
    )
)]
/// Upgrade the HTTP connection into a room client session.
pub async fn ws_handler(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let room = room_service::find_room(&state, &code)?;
    Ok(ws.on_upgrade(move |socket| websocket_service::handle_socket(state, room, socket)))
}

/// Configure the WebSocket endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/rooms/{code}/ws", get(ws_handler))
}
