//! Client-side view of a room: which team this client is, and what happens
//! when that team disappears.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        room_store::RoomStore,
        session::{SessionStore, TEAM_ID_KEY},
    },
    state::{
        membership::{MembershipChange, MembershipWatcher},
        room::{RoomMutation, RoomState, TeamId},
    },
};

/// Binds a room handle to the identity a client remembers for itself.
pub struct RoomClient {
    store: Arc<dyn RoomStore>,
    session: Arc<dyn SessionStore>,
    watcher: MembershipWatcher,
}

impl RoomClient {
    /// Build a client, restoring its team from `session` when one was saved.
    pub fn new(store: Arc<dyn RoomStore>, session: Arc<dyn SessionStore>) -> Self {
        let team_id = session.get(TEAM_ID_KEY).and_then(|raw| {
            Uuid::parse_str(&raw)
                .inspect_err(|err| warn!(error = %err, "discarding unreadable saved team id"))
                .ok()
        });
        if team_id.is_none() {
            session.remove(TEAM_ID_KEY);
        }

        Self {
            store,
            session,
            watcher: MembershipWatcher::new(team_id),
        }
    }

    /// Team this client currently is, if any.
    pub fn team_id(&self) -> Option<TeamId> {
        self.watcher.team_id()
    }

    /// Create a team and become it.
    pub fn join_game(&mut self, name: String) -> TeamId {
        let (team_id, mutation) = RoomMutation::join_game(name);
        self.store.mutate(mutation);
        self.adopt(team_id);
        team_id
    }

    /// Become an existing team, e.g. after a reload.
    pub fn adopt(&mut self, team_id: TeamId) {
        self.session.set(TEAM_ID_KEY, team_id.to_string());
        self.watcher.remember(team_id);
    }

    /// Compare the remembered team against `snapshot`, discarding the saved
    /// identity when the team is gone.
    pub fn observe(&mut self, snapshot: Option<&RoomState>) -> MembershipChange {
        let change = self.watcher.observe(snapshot);
        if let MembershipChange::Left(team_id) = change {
            info!(team_id = %team_id, "team no longer in room; leaving");
            self.session.remove(TEAM_ID_KEY);
        }
        change
    }
}
