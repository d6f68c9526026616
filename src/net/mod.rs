//! Network layer: wire DTOs, the subscription router, the history REST
//! fetch, and the WebSocket chat client.

pub mod api;
pub mod chat_client;
pub mod router;
pub mod types;
