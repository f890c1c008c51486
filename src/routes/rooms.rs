use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::room::{AddScoreRequest, JoinGameRequest, JoinGameResponse, RoomCreated, RoomSnapshot},
    error::AppError,
    services::room_service,
    state::SharedState,
};

/// Routes for opening rooms and editing their teams and scores.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/{code}", get(get_room))
        .route("/rooms/{code}/teams", post(join_game))
        .route("/rooms/{code}/teams/{team_id}", delete(remove_team))
        .route("/rooms/{code}/teams/{team_id}/scores", post(add_score))
        .route(
            "/rooms/{code}/teams/{team_id}/scores/{score_id}",
            delete(delete_score),
        )
        .route("/rooms/{code}/finish", post(finish_game))
}

/// Start a new game in a freshly opened room.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    responses(
        (status = 200, description = "Room opened", body = RoomCreated),
        (status = 409, description = "Room limit reached")
    )
)]
pub async fn create_room(State(state): State<SharedState>) -> Result<Json<RoomCreated>, AppError> {
    Ok(Json(room_service::create_room(&state)?))
}

/// Read the current teams and scores of a room.
#[utoipa::path(
    get,
    path = "/rooms/{code}",
    tag = "rooms",
    params(("code" = String, Path, description = "Six-digit room code")),
    responses(
        (status = 200, description = "Room snapshot", body = RoomSnapshot),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<RoomSnapshot>, AppError> {
    let room = room_service::find_room(&state, &code)?;
    Ok(Json(room_service::snapshot(&room)))
}

/// Join a room as a new team.
#[utoipa::path(
    post,
    path = "/rooms/{code}/teams",
    tag = "rooms",
    params(("code" = String, Path, description = "Six-digit room code")),
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Team created", body = JoinGameResponse),
        (status = 400, description = "Invalid team name"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Path(code): Path<String>,
    Valid(Json(payload)): Valid<Json<JoinGameRequest>>,
) -> Result<Json<JoinGameResponse>, AppError> {
    let room = room_service::find_room(&state, &code)?;
    let team_id = room_service::join_game(&room, &payload.name)?;
    Ok(Json(JoinGameResponse { team_id }))
}

/// Remove a team and its scores. Unknown teams are ignored.
#[utoipa::path(
    delete,
    path = "/rooms/{code}/teams/{team_id}",
    tag = "rooms",
    params(
        ("code" = String, Path, description = "Six-digit room code"),
        ("team_id" = Uuid, Path, description = "Team to remove")
    ),
    responses((status = 204, description = "Removal submitted"))
)]
pub async fn remove_team(
    State(state): State<SharedState>,
    Path((code, team_id)): Path<(String, Uuid)>,
) -> Result<StatusCode, AppError> {
    let room = room_service::find_room(&state, &code)?;
    room_service::remove_team(&room, team_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Record points for a team.
#[utoipa::path(
    post,
    path = "/rooms/{code}/teams/{team_id}/scores",
    tag = "rooms",
    params(
        ("code" = String, Path, description = "Six-digit room code"),
        ("team_id" = Uuid, Path, description = "Team receiving the points")
    ),
    request_body = AddScoreRequest,
    responses(
        (status = 204, description = "Score submitted"),
        (status = 400, description = "Score outside the accepted range")
    )
)]
pub async fn add_score(
    State(state): State<SharedState>,
    Path((code, team_id)): Path<(String, Uuid)>,
    Json(payload): Json<AddScoreRequest>,
) -> Result<StatusCode, AppError> {
    let room = room_service::find_room(&state, &code)?;
    room_service::add_score(&state, &room, team_id, payload.value)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete one score entry of a team.
#[utoipa::path(
    delete,
    path = "/rooms/{code}/teams/{team_id}/scores/{score_id}",
    tag = "rooms",
    params(
        ("code" = String, Path, description = "Six-digit room code"),
        ("team_id" = Uuid, Path, description = "Team owning the score"),
        ("score_id" = Uuid, Path, description = "Score entry to delete")
    ),
    responses(
        (status = 204, description = "Deletion submitted"),
        (status = 403, description = "Score deletion disabled")
    )
)]
pub async fn delete_score(
    State(state): State<SharedState>,
    Path((code, team_id, score_id)): Path<(String, Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    let room = room_service::find_room(&state, &code)?;
    room_service::delete_score(&state, &room, team_id, score_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Finish the game: every team and score is removed.
#[utoipa::path(
    post,
    path = "/rooms/{code}/finish",
    tag = "rooms",
    params(("code" = String, Path, description = "Six-digit room code")),
    responses((status = 204, description = "Game finished"))
)]
pub async fn finish_game(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    let room = room_service::find_room(&state, &code)?;
    room_service::finish_game(&room);
    Ok(StatusCode::NO_CONTENT)
}
