use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_team_name},
    state::room::{RoomState, Score, Team, TeamId},
};

/// Returned when a new room has been opened.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomCreated {
    /// Six-digit code players type to join.
    pub code: String,
    /// RFC 3339 opening time.
    pub opened_at: String,
}

impl RoomCreated {
    /// Build the response for a room opened at `opened_at`.
    pub fn new(code: String, opened_at: SystemTime) -> Self {
        Self {
            code,
            opened_at: format_system_time(opened_at),
        }
    }
}

/// Whole-room projection sent to REST, SSE and WebSocket clients.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RoomSnapshot {
    /// Room code.
    pub code: String,
    /// Increases with every applied mutation.
    pub version: u64,
    /// Teams in join order.
    pub teams: Vec<TeamSummary>,
}

impl RoomSnapshot {
    /// Project `room` for the wire.
    pub fn new(code: &str, room: &RoomState) -> Self {
        Self {
            code: code.to_string(),
            version: room.version,
            teams: room.teams.iter().map(TeamSummary::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
/// Public projection of a team with its computed total.
pub struct TeamSummary {
    /// Team identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Sum of every score entry.
    pub total: i64,
    /// Score entries in the order they were added.
    pub scores: Vec<ScoreSummary>,
}

impl From<(&TeamId, &Team)> for TeamSummary {
    fn from((id, team): (&TeamId, &Team)) -> Self {
        Self {
            id: *id,
            name: team.name.clone(),
            total: team.total(),
            scores: team.scores.iter().map(ScoreSummary::from).collect(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
/// A single recorded points entry.
pub struct ScoreSummary {
    /// Entry identifier, used to delete it.
    pub id: Uuid,
    /// Points recorded.
    pub value: i64,
}

impl From<&Score> for ScoreSummary {
    fn from(score: &Score) -> Self {
        Self {
            id: score.id,
            value: score.value,
        }
    }
}

/// Payload used to join a room as a new team.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinGameRequest {
    /// Team name; surrounding whitespace is ignored.
    #[validate(custom(function = "validate_team_name"))]
    pub name: String,
}

/// Identifier the joining client should remember as its own team.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct JoinGameResponse {
    /// Identifier of the new team.
    pub team_id: Uuid,
}

/// Points to record for a team.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddScoreRequest {
    /// Points to add.
    pub value: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::room::RoomMutation;

    #[test]
    fn snapshot_lists_teams_in_order_with_totals() {
        let mut room = RoomState::new();
        let (alpha, join_alpha) = RoomMutation::join_game("Alpha");
        let (beta, join_beta) = RoomMutation::join_game("Beta");
        room.apply(join_alpha);
        room.apply(join_beta);
        room.apply(RoomMutation::add_score(beta, 30));
        room.apply(RoomMutation::add_score(beta, 12));

        let snapshot = RoomSnapshot::new("000000", &room);

        assert_eq!(snapshot.version, 4);
        assert_eq!(snapshot.teams.len(), 2);
        assert_eq!(snapshot.teams[0].id, alpha);
        assert_eq!(snapshot.teams[0].total, 0);
        assert_eq!(snapshot.teams[1].id, beta);
        assert_eq!(snapshot.teams[1].total, 42);
        assert_eq!(snapshot.teams[1].scores.len(), 2);
    }

    #[test]
    fn join_request_rejects_blank_and_long_names() {
        let ok = JoinGameRequest {
            name: "Alpha".into(),
        };
        assert!(ok.validate().is_ok());

        let blank = JoinGameRequest { name: "   ".into() };
        assert!(blank.validate().is_err());

        let empty = JoinGameRequest { name: "".into() };
        assert!(empty.validate().is_err());

        let long = JoinGameRequest {
            name: "x".repeat(65),
        };
        assert!(long.validate().is_err());

        let padded = JoinGameRequest {
            name: format!("  {}  ", "x".repeat(60)),
        };
        assert!(padded.validate().is_ok());
    }
}
