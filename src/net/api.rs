//! REST helper for the one-shot chat history fetch.
//!
//! Client-side (hydrate): real HTTP via `gloo-net`. Server-side: a stub
//! returning `None`, since history only matters in the browser.
//!
//! ERROR HANDLING
//! ==============
//! Every failure mode — network error, non-2xx, undecodable body — logs a
//! warning and returns `None`. The caller leaves the buffer empty and live
//! messages keep working; history is never worth blocking the channel for.

#![allow(clippy::unused_async)]

use crate::state::chat::ChatMessage;

/// URL of the recent-history endpoint for a project.
pub fn recent_history_url(project_id: &str) -> String {
    format!("/api/chat/{project_id}/recent")
}

/// Fetch the most recent messages for `project_id` (the server bounds the
/// count; currently ten). Returns `None` on any failure.
pub async fn fetch_recent_messages(project_id: &str, token: &str) -> Option<Vec<ChatMessage>> {
    #[cfg(feature = "hydrate")]
    {
        use crate::net::types::WireChatMessage;

        let url = recent_history_url(project_id);
        let resp = match gloo_net::http::Request::get(&url)
            .header("Authorization", &format!("Bearer {token}"))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                leptos::logging::warn!("chat: history fetch failed: {e}");
                return None;
            }
        };
        if !resp.ok() {
            leptos::logging::warn!("chat: history fetch returned {}", resp.status());
            return None;
        }
        match resp.json::<Vec<WireChatMessage>>().await {
            Ok(records) => Some(records.into_iter().map(ChatMessage::from).collect()),
            Err(e) => {
                leptos::logging::warn!("chat: history body undecodable: {e}");
                None
            }
        }
    }
    #[cfg(not(feature = "hydrate"))]
    {
        let _ = (project_id, token);
        None
    }
}
