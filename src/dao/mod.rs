/// Synchronized room documents.
pub mod room_store;
/// Client-side session identity storage.
pub mod session;
