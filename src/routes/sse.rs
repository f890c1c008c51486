use std::convert::Infallible;

use axum::{
    Router,
    extract::{Path, State},
    response::sse::Sse,
    routing::get,
};
use futures::Stream;
use tracing::info;

use crate::{
    error::AppError,
    services::{room_service, sse_service},
    state::SharedState,
};

#[utoipa::path(
    get,
    path = "/rooms/{code}/sse",
    tag = "sse",
    params(("code" = String, Path, description = "Six-digit room code")),
    responses(
        (status = 200, description = "Room snapshot stream", content_type = "text/event-stream", body = String),
        (status = 404, description = "Room not found")
    )
)]
/// Stream every snapshot of a room, starting with the current one.
pub async fn room_stream(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>>, AppError> {
    let room = room_service::find_room(&state, &code)?;
    info!(room = %room.code, "New room SSE connection");
    Ok(sse_service::to_sse_stream(&room))
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/rooms/{code}/sse", get(room_stream))
}
