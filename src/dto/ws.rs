use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::room::RoomSnapshot;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from room WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Resume as a team remembered from an earlier session.
    Identify {
        /// Team id saved by the client.
        team_id: Uuid,
    },
    /// Create a team and become it.
    Join {
        /// Team name.
        name: String,
    },
    /// Record points for the connection's own team.
    AddScore {
        /// Points to add.
        value: i64,
    },
    /// Delete one of the connection's own score entries.
    DeleteScore {
        /// Entry to delete.
        score_id: Uuid,
    },
    /// Remove any team from the room.
    RemoveTeam {
        /// Team to remove.
        team_id: Uuid,
    },
    /// Clear every team and score.
    FinishGame,
    /// Any message type this server does not know.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse one text frame.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages pushed to room WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Full room state, sent on connect and after every change.
    Snapshot {
        /// Current room state.
        room: RoomSnapshot,
    },
    /// The connection is now this team.
    Joined {
        /// Team the connection now speaks for.
        team_id: Uuid,
    },
    /// The connection's team vanished from the room; its identity was dropped.
    Left {
        /// Team that was removed.
        team_id: Uuid,
    },
    /// A request was rejected.
    Error {
        /// Why the request was rejected.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_client_messages() {
        let msg = ClientMessage::from_json_str(r#"{"type":"add_score","value":25}"#).unwrap();
        assert!(matches!(msg, ClientMessage::AddScore { value: 25 }));

        let msg = ClientMessage::from_json_str(r#"{"type":"finish_game"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::FinishGame));

        let msg = ClientMessage::from_json_str(r#"{"type":"dance"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Unknown));

        assert!(ClientMessage::from_json_str(r#"{"type":"join"}"#).is_err());
    }

    #[test]
    fn snapshot_message_wraps_room() {
        let msg = ServerMessage::Snapshot {
            room: RoomSnapshot {
                code: "000000".into(),
                version: 3,
                teams: Vec::new(),
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "snapshot",
                "room": { "code": "000000", "version": 3, "teams": [] }
            })
        );
    }
}
