use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the card scoring backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::get_room,
        crate::routes::rooms::join_game,
        crate::routes::rooms::remove_team,
        crate::routes::rooms::add_score,
        crate::routes::rooms::delete_score,
        crate::routes::rooms::finish_game,
        crate::routes::sse::room_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::RoomCreated,
            crate::dto::room::RoomSnapshot,
            crate::dto::room::TeamSummary,
            crate::dto::room::ScoreSummary,
            crate::dto::room::JoinGameRequest,
            crate::dto::room::JoinGameResponse,
            crate::dto::room::AddScoreRequest,
            crate::dto::ws::ClientMessage,
            crate::dto::ws::ServerMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Teams and scores of a room"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
