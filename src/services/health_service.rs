use tracing::debug;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report liveness together with the number of open rooms.
pub fn health_status(state: &SharedState) -> HealthResponse {
    let rooms = state.room_count();
    debug!(rooms, "health check");
    HealthResponse::ok(rooms)
}
