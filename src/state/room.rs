//! Shared room document: teams, their score entries, and the mutations clients
//! may apply to it.
//!
//! Every mutation is a single structural edit. Edits that target a team or a
//! score which no longer exists degrade to no-ops, so two clients racing on the
//! same target converge without either one observing an error.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a team inside a room.
pub type TeamId = Uuid;
/// Identifier of a score entry inside a team.
pub type ScoreId = Uuid;

/// A single points entry recorded for a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Unique identifier within the owning team.
    pub id: ScoreId,
    /// Points recorded for the round, stored exactly as submitted.
    pub value: i64,
}

/// A team and the ordered list of points it recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Display name chosen when joining.
    pub name: String,
    /// Score entries in the order they were added.
    pub scores: Vec<Score>,
}

impl Team {
    /// Build an empty team.
    pub fn new(name: String) -> Self {
        Self {
            name,
            scores: Vec::new(),
        }
    }

    /// Sum of every recorded value. Saturates instead of wrapping.
    pub fn total(&self) -> i64 {
        self.scores
            .iter()
            .fold(0i64, |acc, score| acc.saturating_add(score.value))
    }
}

/// Root of a room: the teams in join order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomState {
    /// Number of mutations applied since the room was opened.
    pub version: u64,
    /// Teams keyed by identifier, iterated in join order.
    pub teams: IndexMap<TeamId, Team>,
}

impl RoomState {
    /// Empty room at version zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a team by identifier.
    pub fn team(&self, id: &TeamId) -> Option<&Team> {
        self.teams.get(id)
    }

    /// Whether a team with this identifier is currently in the room.
    pub fn contains_team(&self, id: &TeamId) -> bool {
        self.teams.contains_key(id)
    }

    /// Apply `mutation` and bump the version when it changed anything.
    pub fn apply(&mut self, mutation: RoomMutation) -> MutationOutcome {
        let outcome = mutation.apply(&mut self.teams);
        if outcome.is_applied() {
            self.version += 1;
        }
        outcome
    }
}

/// Structural edits accepted by a room.
///
/// Identifiers are generated when the mutation is built, not when it is
/// applied, so replaying the same mutation never creates a second entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RoomMutation {
    /// Append a new team at the end of the room.
    JoinGame {
        /// Identifier of the new team.
        team_id: TeamId,
        /// Display name, already trimmed.
        name: String,
    },
    /// Remove a team together with all of its scores.
    RemoveTeam {
        /// Team to remove.
        team_id: TeamId,
    },
    /// Remove every team.
    FinishGame,
    /// Append a score entry to a team.
    AddScore {
        /// Team receiving the points.
        team_id: TeamId,
        /// Identifier of the new entry.
        score_id: ScoreId,
        /// Points recorded.
        value: i64,
    },
    /// Remove a single score entry from a team.
    DeleteScore {
        /// Team owning the entry.
        team_id: TeamId,
        /// Entry to remove.
        score_id: ScoreId,
    },
}

impl RoomMutation {
    /// Build a join mutation with a freshly generated team id.
    pub fn join_game(name: impl Into<String>) -> (TeamId, Self) {
        let team_id = Uuid::new_v4();
        (
            team_id,
            Self::JoinGame {
                team_id,
                name: name.into(),
            },
        )
    }

    /// Build an add-score mutation with a freshly generated score id.
    pub fn add_score(team_id: TeamId, value: i64) -> Self {
        Self::AddScore {
            team_id,
            score_id: Uuid::new_v4(),
            value,
        }
    }

    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::JoinGame { .. } => "join_game",
            Self::RemoveTeam { .. } => "remove_team",
            Self::FinishGame => "finish_game",
            Self::AddScore { .. } => "add_score",
            Self::DeleteScore { .. } => "delete_score",
        }
    }

    fn apply(self, teams: &mut IndexMap<TeamId, Team>) -> MutationOutcome {
        match self {
            Self::JoinGame { team_id, name } => {
                if teams.contains_key(&team_id) {
                    return MutationOutcome::Skipped;
                }
                teams.insert(team_id, Team::new(name));
                MutationOutcome::Applied
            }
            Self::RemoveTeam { team_id } => teams.shift_remove(&team_id).into(),
            Self::FinishGame => {
                teams.clear();
                MutationOutcome::Applied
            }
            Self::AddScore {
                team_id,
                score_id,
                value,
            } => {
                let Some(team) = teams.get_mut(&team_id) else {
                    return MutationOutcome::Skipped;
                };
                if team.scores.iter().any(|score| score.id == score_id) {
                    return MutationOutcome::Skipped;
                }
                team.scores.push(Score {
                    id: score_id,
                    value,
                });
                MutationOutcome::Applied
            }
            Self::DeleteScore { team_id, score_id } => {
                let Some(team) = teams.get_mut(&team_id) else {
                    return MutationOutcome::Skipped;
                };
                let before = team.scores.len();
                team.scores.retain(|score| score.id != score_id);
                if team.scores.len() == before {
                    MutationOutcome::Skipped
                } else {
                    MutationOutcome::Applied
                }
            }
        }
    }
}

/// Whether a mutation changed the room or found nothing to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The room changed.
    Applied,
    /// The target was missing or already present; nothing changed.
    Skipped,
}

impl MutationOutcome {
    /// Whether the room changed.
    pub fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl<T> From<Option<T>> for MutationOutcome {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(_) => Self::Applied,
            None => Self::Skipped,
        }
    }
}
