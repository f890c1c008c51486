mod memory;

pub use self::memory::MemoryRoomStore;

use tokio::sync::watch;

use crate::state::room::{RoomMutation, RoomState};

/// Handle on a synchronized room document.
///
/// Readers take whole snapshots; writers submit [`RoomMutation`]s without
/// waiting for the result. Every subscriber, including the submitter, learns
/// about the new state through [`RoomStore::subscribe`].
pub trait RoomStore: Send + Sync {
    /// Current state of the room.
    fn snapshot(&self) -> RoomState;
    /// Receiver notified whenever a mutation changes the room.
    fn subscribe(&self) -> watch::Receiver<RoomState>;
    /// Number of live subscriptions.
    fn subscriber_count(&self) -> usize;
    /// Submit a mutation. Mutations from one caller are applied in submission order.
    fn mutate(&self, mutation: RoomMutation);
}
