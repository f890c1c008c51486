//! Business logic behind the room REST routes and WebSocket sessions.
//! Requests are validated here, then handed to the room's store as a single
//! mutation; the resulting state reaches callers through their subscription.

use tracing::info;

use crate::{
    dao::room_store::RoomStore,
    dto::{
        room::{RoomCreated, RoomSnapshot},
        validation::validate_room_code,
    },
    error::ServiceError,
    state::{
        RoomHandle, SharedState,
        room::{RoomMutation, ScoreId, TeamId},
    },
};

/// Resolve an open room, rejecting malformed codes before the lookup.
pub fn find_room(state: &SharedState, code: &str) -> Result<RoomHandle, ServiceError> {
    validate_room_code(code).map_err(|err| {
        ServiceError::InvalidInput(
            err.message
                .map(|message| message.into_owned())
                .unwrap_or_else(|| "invalid room code".into()),
        )
    })?;
    state.room(code)
}

/// Start a new game under a fresh room code.
pub fn create_room(state: &SharedState) -> Result<RoomCreated, ServiceError> {
    let room = state.create_room()?;
    Ok(RoomCreated::new(room.code, room.opened_at))
}

/// Current state of a room.
pub fn snapshot(room: &RoomHandle) -> RoomSnapshot {
    RoomSnapshot::new(&room.code, &room.store.snapshot())
}

/// Trim and check a team name coming from any transport.
pub fn sanitize_team_name(name: &str) -> Result<String, ServiceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidInput("team name must not be blank".into()));
    }
    Ok(trimmed.to_string())
}

/// Check a score value against the configured bounds.
pub fn check_score(state: &SharedState, value: i64) -> Result<(), ServiceError> {
    match state.config().score_bounds() {
        Some(bounds) if !bounds.contains(&value) => Err(ServiceError::InvalidInput(format!(
            "score must be between {} and {} (got {value})",
            bounds.start(),
            bounds.end()
        ))),
        _ => Ok(()),
    }
}

/// Append a new team to the room and return the identifier the caller should remember.
pub fn join_game(room: &RoomHandle, name: &str) -> Result<TeamId, ServiceError> {
    let name = sanitize_team_name(name)?;
    let (team_id, mutation) = RoomMutation::join_game(name);
    room.store.mutate(mutation);
    info!(room = %room.code, team_id = %team_id, "team joined");
    Ok(team_id)
}

/// Remove a team and all of its scores. Unknown teams are ignored.
pub fn remove_team(room: &RoomHandle, team_id: TeamId) {
    room.store.mutate(RoomMutation::RemoveTeam { team_id });
    info!(room = %room.code, team_id = %team_id, "team removal submitted");
}

/// Remove every team from the room.
pub fn finish_game(room: &RoomHandle) {
    room.store.mutate(RoomMutation::FinishGame);
    info!(room = %room.code, "game finished");
}

/// Record points for a team. Unknown teams are ignored.
pub fn add_score(
    state: &SharedState,
    room: &RoomHandle,
    team_id: TeamId,
    value: i64,
) -> Result<(), ServiceError> {
    check_score(state, value)?;
    room.store.mutate(RoomMutation::add_score(team_id, value));
    info!(room = %room.code, team_id = %team_id, value, "score submitted");
    Ok(())
}

/// Delete a single score entry. Unknown teams or entries are ignored.
pub fn delete_score(
    state: &SharedState,
    room: &RoomHandle,
    team_id: TeamId,
    score_id: ScoreId,
) -> Result<(), ServiceError> {
    if !state.config().allow_score_deletion() {
        return Err(ServiceError::Disabled(
            "deleting individual scores is disabled".into(),
        ));
    }
    room.store
        .mutate(RoomMutation::DeleteScore { team_id, score_id });
    info!(room = %room.code, team_id = %team_id, score_id = %score_id, "score deletion submitted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{config::AppConfig, state::AppState};

    fn setup(config: AppConfig) -> (SharedState, RoomHandle) {
        let state = AppState::new(config);
        let room = find_room(&state, "000000").unwrap();
        (state, room)
    }

    #[test]
    fn find_room_rejects_malformed_and_unknown_codes() {
        let (state, _) = setup(AppConfig::default());
        assert!(matches!(
            find_room(&state, "abc"),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            find_room(&state, "654321"),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn created_room_is_reachable() {
        let (state, _) = setup(AppConfig::default());
        let created = create_room(&state).unwrap();
        let room = find_room(&state, &created.code).unwrap();
        assert!(snapshot(&room).teams.is_empty());
    }

    #[test]
    fn join_trims_and_rejects_blank_names() {
        let (_, room) = setup(AppConfig::default());
        let id = join_game(&room, "  Alpha  ").unwrap();
        let snap = snapshot(&room);
        assert_eq!(snap.teams[0].id, id);
        assert_eq!(snap.teams[0].name, "Alpha");

        assert!(matches!(
            join_game(&room, "   "),
            Err(ServiceError::InvalidInput(_))
        ));
        assert_eq!(snapshot(&room).teams.len(), 1);
    }

    #[test]
    fn scores_outside_bounds_are_rejected() {
        let (state, room) = setup(AppConfig::default());
        let id = join_game(&room, "Alpha").unwrap();

        for value in [0, -5, 100_000] {
            assert!(matches!(
                add_score(&state, &room, id, value),
                Err(ServiceError::InvalidInput(_))
            ));
        }
        add_score(&state, &room, id, 1).unwrap();
        add_score(&state, &room, id, 99_999).unwrap();
        assert_eq!(snapshot(&room).teams[0].total, 100_000);
    }

    #[test]
    fn unbounded_config_accepts_any_value() {
        let config = AppConfig::from_json(r#"{ "enforce_score_bounds": false }"#).unwrap();
        let (state, room) = setup(config);
        let id = join_game(&room, "Alpha").unwrap();
        add_score(&state, &room, id, -40).unwrap();
        assert_eq!(snapshot(&room).teams[0].total, -40);
    }

    #[test]
    fn scenario_add_then_delete() {
        let (state, room) = setup(AppConfig::default());
        let alpha = join_game(&room, "Alpha").unwrap();
        add_score(&state, &room, alpha, 10).unwrap();
        add_score(&state, &room, alpha, 5).unwrap();
        assert_eq!(snapshot(&room).teams[0].total, 15);

        let ten = snapshot(&room).teams[0].scores[0].id;
        delete_score(&state, &room, alpha, ten).unwrap();
        assert_eq!(snapshot(&room).teams[0].total, 5);
    }

    #[test]
    fn deletion_can_be_disabled() {
        let config = AppConfig::from_json(r#"{ "allow_score_deletion": false }"#).unwrap();
        let (state, room) = setup(config);
        let alpha = join_game(&room, "Alpha").unwrap();
        add_score(&state, &room, alpha, 10).unwrap();
        let score = snapshot(&room).teams[0].scores[0].id;

        assert!(matches!(
            delete_score(&state, &room, alpha, score),
            Err(ServiceError::Disabled(_))
        ));
        assert_eq!(snapshot(&room).teams[0].total, 10);
    }

    #[test]
    fn missing_targets_are_silent() {
        let (state, room) = setup(AppConfig::default());
        let ghost = Uuid::new_v4();
        remove_team(&room, ghost);
        add_score(&state, &room, ghost, 5).unwrap();
        delete_score(&state, &room, ghost, Uuid::new_v4()).unwrap();
        assert_eq!(snapshot(&room).version, 0);
    }

    #[test]
    fn finish_game_empties_room() {
        let (state, room) = setup(AppConfig::default());
        let alpha = join_game(&room, "Alpha").unwrap();
        join_game(&room, "Beta").unwrap();
        add_score(&state, &room, alpha, 7).unwrap();

        finish_game(&room);
        assert!(snapshot(&room).teams.is_empty());
    }
}
