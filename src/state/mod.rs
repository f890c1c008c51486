/// Leave detection for a client's remembered team.
pub mod membership;
pub mod room;

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::{Duration, SystemTime},
};

use dashmap::{DashMap, mapref::entry::Entry};
use rand::Rng;
use tracing::info;

use crate::{
    config::AppConfig,
    dao::room_store::{MemoryRoomStore, RoomStore},
    error::ServiceError,
};

/// Application state shared by every handler.
pub type SharedState = Arc<AppState>;

/// Number of distinct six-digit room codes.
const ROOM_CODE_SPACE: u32 = 1_000_000;
/// How long a created room that nobody ever used is kept without subscribers.
const UNUSED_ROOM_GRACE: Duration = Duration::from_secs(600);

#[derive(Clone)]
/// An open room and the handle on its synchronized document.
pub struct RoomHandle {
    /// Six-digit code the room is reached by.
    pub code: String,
    /// When the room was opened.
    pub opened_at: SystemTime,
    /// The room's synchronized document.
    pub store: Arc<dyn RoomStore>,
}

impl RoomHandle {
    /// Whether the room can be closed to free its slot.
    ///
    /// Rooms with a live subscriber or with teams are kept. An empty room is
    /// idle once it has seen a mutation (the game was played and finished), or
    /// once it has stayed unused for [`UNUSED_ROOM_GRACE`].
    fn is_idle(&self, now: SystemTime) -> bool {
        if self.store.subscriber_count() > 0 {
            return false;
        }
        let room = self.store.snapshot();
        if !room.teams.is_empty() {
            return false;
        }
        room.version > 0
            || now
                .duration_since(self.opened_at)
                .is_ok_and(|age| age >= UNUSED_ROOM_GRACE)
    }
}

/// Central application state: configuration and the registry of open rooms.
pub struct AppState {
    config: Arc<AppConfig>,
    rooms: DashMap<String, RoomHandle>,
    /// Rooms counted against `max_rooms`, reserved before the map insert.
    slots: AtomicUsize,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The configured default room is opened immediately.
    pub fn new(config: AppConfig) -> SharedState {
        let state = Arc::new(Self {
            config: Arc::new(config),
            rooms: DashMap::new(),
            slots: AtomicUsize::new(0),
        });
        let default_room = state.config.default_room().to_string();
        state.open_room(&default_room);
        state
    }

    /// Shared runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    /// Number of rooms currently open.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Look up an open room by code.
    pub fn room(&self, code: &str) -> Result<RoomHandle, ServiceError> {
        self.rooms
            .get(code)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ServiceError::NotFound(format!("room `{code}` not found")))
    }

    /// Open the room `code`, or return it when it is already open.
    ///
    /// Rooms opened this way count towards the limit but are never refused.
    pub fn open_room(&self, code: &str) -> RoomHandle {
        self.rooms
            .entry(code.to_string())
            .or_insert_with(|| {
                self.slots.fetch_add(1, Ordering::AcqRel);
                info!(room = %code, "room opened");
                new_room(code.to_string())
            })
            .value()
            .clone()
    }

    /// Open a room under a fresh random code.
    ///
    /// When the limit is reached, idle rooms are closed first; the request is
    /// refused only if no slot could be freed.
    pub fn create_room(&self) -> Result<RoomHandle, ServiceError> {
        if !self.reserve_slot() {
            self.close_idle_rooms();
            if !self.reserve_slot() {
                return Err(ServiceError::InvalidState(format!(
                    "room limit of {} reached",
                    self.config.max_rooms()
                )));
            }
        }

        let mut rng = rand::rng();
        loop {
            let code = format!("{:06}", rng.random_range(0..ROOM_CODE_SPACE));
            if let Entry::Vacant(slot) = self.rooms.entry(code.clone()) {
                let handle = slot.insert(new_room(code.clone())).value().clone();
                info!(room = %code, "room created");
                return Ok(handle);
            }
        }
    }

    /// Close every idle room except the default one. Returns how many were closed.
    pub fn close_idle_rooms(&self) -> usize {
        let now = SystemTime::now();
        let default_room = self.config.default_room();
        let mut closed = 0;
        self.rooms.retain(|code, room| {
            if code == default_room || !room.is_idle(now) {
                return true;
            }
            self.slots.fetch_sub(1, Ordering::AcqRel);
            closed += 1;
            info!(room = %code, "idle room closed");
            false
        });
        closed
    }

    fn reserve_slot(&self) -> bool {
        let max_rooms = self.config.max_rooms();
        self.slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |open| {
                (open < max_rooms).then_some(open + 1)
            })
            .is_ok()
    }
}

fn new_room(code: String) -> RoomHandle {
    RoomHandle {
        code,
        opened_at: SystemTime::now(),
        store: Arc::new(MemoryRoomStore::new()),
    }
}
