use crate::state::room::{RoomState, TeamId};

/// Result of comparing the remembered team against a fresh snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipChange {
    /// Still a member, not a member of anything, or nothing loaded yet.
    Unchanged,
    /// The remembered team is gone from the room.
    Left(TeamId),
}

/// Tracks which team a client believes it is and notices when that team
/// disappears from the room, whoever removed it.
#[derive(Debug, Clone, Default)]
pub struct MembershipWatcher {
    team_id: Option<TeamId>,
}

impl MembershipWatcher {
    /// Start watching for `team_id`, if the client already has one.
    pub fn new(team_id: Option<TeamId>) -> Self {
        Self { team_id }
    }

    /// Team the client currently believes it belongs to.
    pub fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    /// Replace the remembered team.
    pub fn remember(&mut self, team_id: TeamId) {
        self.team_id = Some(team_id);
    }

    /// Compare the remembered team with `snapshot`.
    ///
    /// `None` means the room has not been loaded yet and never triggers a
    /// leave. Once a leave is reported the team is forgotten, so the change is
    /// reported exactly once.
    pub fn observe(&mut self, snapshot: Option<&RoomState>) -> MembershipChange {
        let (Some(room), Some(team_id)) = (snapshot, self.team_id) else {
            return MembershipChange::Unchanged;
        };

        if room.contains_team(&team_id) {
            MembershipChange::Unchanged
        } else {
            self.team_id = None;
            MembershipChange::Left(team_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::room::RoomMutation;

    fn room_with(names: &[&str]) -> (RoomState, Vec<TeamId>) {
        let mut room = RoomState::new();
        let ids = names
            .iter()
            .map(|name| {
                let (id, mutation) = RoomMutation::join_game(*name);
                room.apply(mutation);
                id
            })
            .collect();
        (room, ids)
    }

    #[test]
    fn not_loaded_snapshot_is_ignored() {
        let mut watcher = MembershipWatcher::new(Some(TeamId::new_v4()));
        assert_eq!(watcher.observe(None), MembershipChange::Unchanged);
        assert!(watcher.team_id().is_some());
    }

    #[test]
    fn member_stays_while_team_exists() {
        let (room, ids) = room_with(&["Alpha", "Beta"]);
        let mut watcher = MembershipWatcher::new(Some(ids[0]));
        assert_eq!(watcher.observe(Some(&room)), MembershipChange::Unchanged);
        assert_eq!(watcher.team_id(), Some(ids[0]));
    }

    #[test]
    fn removal_of_own_team_is_reported_once() {
        let (mut room, ids) = room_with(&["Alpha", "Beta"]);
        let mut alpha = MembershipWatcher::new(Some(ids[0]));
        let mut beta = MembershipWatcher::new(Some(ids[1]));

        room.apply(RoomMutation::RemoveTeam { team_id: ids[0] });

        assert_eq!(alpha.observe(Some(&room)), MembershipChange::Left(ids[0]));
        assert_eq!(alpha.team_id(), None);
        assert_eq!(alpha.observe(Some(&room)), MembershipChange::Unchanged);
        assert_eq!(beta.observe(Some(&room)), MembershipChange::Unchanged);
    }

    #[test]
    fn finish_game_makes_every_member_leave() {
        let (mut room, ids) = room_with(&["Alpha", "Beta"]);
        let mut watchers: Vec<_> = ids
            .iter()
            .map(|id| MembershipWatcher::new(Some(*id)))
            .collect();

        room.apply(RoomMutation::FinishGame);

        for (watcher, id) in watchers.iter_mut().zip(&ids) {
            assert_eq!(watcher.observe(Some(&room)), MembershipChange::Left(*id));
        }
    }

    #[test]
    fn spectator_never_leaves() {
        let (mut room, _) = room_with(&["Alpha"]);
        let mut watcher = MembershipWatcher::default();
        room.apply(RoomMutation::FinishGame);
        assert_eq!(watcher.observe(Some(&room)), MembershipChange::Unchanged);
    }
}
