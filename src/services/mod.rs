/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Client-side room view and membership tracking.
pub mod room_client;
/// Room operations shared by REST and WebSocket transports.
pub mod room_service;
/// Server-Sent Events snapshot streaming.
pub mod sse_service;
/// WebSocket connection and message handling service.
pub mod websocket_service;
