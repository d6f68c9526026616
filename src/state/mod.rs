//! Client-side state models.
//!
//! DESIGN
//! ======
//! State is split by domain (`auth`, `chat`) so the panel and the network
//! layer can depend on small focused models. These modules are plain Rust
//! with no browser dependencies.

pub mod auth;
pub mod chat;
