use tokio::sync::watch;
use tracing::debug;

use crate::{
    dao::room_store::RoomStore,
    state::room::{RoomMutation, RoomState},
};

/// In-process room document backed by a Tokio watch channel.
///
/// `send_if_modified` holds the channel's write lock while the mutation runs,
/// so concurrent submissions are serialized and subscribers are only woken
/// when the room actually changed.
pub struct MemoryRoomStore {
    state: watch::Sender<RoomState>,
}

impl MemoryRoomStore {
    /// Open an empty room.
    pub fn new() -> Self {
        Self::with_state(RoomState::new())
    }

    /// Open a room seeded with `state`.
    pub fn with_state(state: RoomState) -> Self {
        let (sender, _receiver) = watch::channel(state);
        Self { state: sender }
    }
}

impl Default for MemoryRoomStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RoomStore for MemoryRoomStore {
    fn snapshot(&self) -> RoomState {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<RoomState> {
        self.state.subscribe()
    }

    fn subscriber_count(&self) -> usize {
        self.state.receiver_count()
    }

    fn mutate(&self, mutation: RoomMutation) {
        let kind = mutation.kind();
        self.state.send_if_modified(|room| {
            let outcome = room.apply(mutation);
            if !outcome.is_applied() {
                debug!(mutation = kind, "mutation target missing; skipped");
            }
            outcome.is_applied()
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::timeout;

    use super::*;

    #[tokio::test]
    async fn subscribers_see_applied_mutations() {
        let store = MemoryRoomStore::new();
        let mut receiver = store.subscribe();

        let (alpha, join) = RoomMutation::join_game("Alpha");
        store.mutate(join);

        receiver.changed().await.unwrap();
        let room = receiver.borrow_and_update().clone();
        assert!(room.contains_team(&alpha));
        assert_eq!(room.version, 1);
        assert_eq!(store.snapshot(), room);
    }

    #[tokio::test]
    async fn skipped_mutations_do_not_wake_subscribers() {
        let store = MemoryRoomStore::new();
        let mut receiver = store.subscribe();

        store.mutate(RoomMutation::RemoveTeam {
            team_id: uuid::Uuid::new_v4(),
        });

        assert!(!receiver.has_changed().unwrap());
        assert!(
            timeout(Duration::from_millis(20), receiver.changed())
                .await
                .is_err()
        );
        assert_eq!(store.snapshot().version, 0);
    }

    #[tokio::test]
    async fn concurrent_submissions_all_land() {
        let store = Arc::new(MemoryRoomStore::new());
        let (alpha, join) = RoomMutation::join_game("Alpha");
        store.mutate(join);

        let tasks: Vec<_> = (1..=50)
            .map(|value| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.mutate(RoomMutation::add_score(alpha, value)) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let room = store.snapshot();
        assert_eq!(room.team(&alpha).unwrap().total(), (1..=50).sum::<i64>());
        assert_eq!(room.version, 51);
    }

    #[tokio::test]
    async fn subscriber_count_follows_receivers() {
        let store = MemoryRoomStore::new();
        assert_eq!(store.subscriber_count(), 0);
        let first = store.subscribe();
        let _second = store.subscribe();
        assert_eq!(store.subscriber_count(), 2);
        drop(first);
        assert_eq!(store.subscriber_count(), 1);
    }
}
