//! Small pure helpers shared by the panel and the network layer.

pub mod sanitize;
pub mod time;
