//! Library crate for card-scoring-back, exposing modules for binaries and tests.

/// Runtime configuration.
pub mod config;
/// Room documents and session storage.
pub mod dao;
/// Wire types for REST, SSE and WebSocket.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP route trees.
pub mod routes;
/// Room operations and transports.
pub mod services;
/// Shared application state and the room model.
pub mod state;
