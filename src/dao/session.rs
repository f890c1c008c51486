use dashmap::DashMap;

/// Key under which a client remembers which team it is.
pub const TEAM_ID_KEY: &str = "teamId";

/// Small persistent key-value capability a client keeps across page loads.
pub trait SessionStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;
    /// Write or overwrite a value.
    fn set(&self, key: &str, value: String);
    /// Remove a value; absent keys are ignored.
    fn remove(&self, key: &str);
}

/// Session storage living as long as the owning connection.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: DashMap<String, String>,
}

impl MemorySessionStore {
    /// Empty session.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}
