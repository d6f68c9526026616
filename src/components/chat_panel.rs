//! Project chat panel: status line, message history, and the send row.
//!
//! The panel is a pure projection of [`ChatClient`] state. It owns exactly
//! one client, drives it from the host-supplied props, and tears it down on
//! unmount, so navigating between projects can never leak a socket.

#[cfg(test)]
#[path = "chat_panel_test.rs"]
mod chat_panel_test;

use leptos::prelude::*;

use crate::net::chat_client::ChatClient;
use crate::state::auth::CurrentUser;
use crate::state::chat::ConnectionState;
use crate::util::time::format_message_time;

/// Per-project chat panel.
///
/// The hosting view supplies the collaborator inputs; everything about the
/// live session is handled internally. `is_chat_enabled` should be true
/// only when the viewer is the project owner or a listed co-worker and the
/// project is still open.
#[component]
pub fn ChatPanel(
    /// Project whose channel to join.
    #[prop(into)]
    project_id: Signal<Option<String>>,
    /// Whether the viewer may use chat for this project.
    #[prop(into)]
    is_chat_enabled: Signal<bool>,
    /// The authenticated viewer.
    #[prop(into)]
    current_user: Signal<Option<CurrentUser>>,
    /// Bearer token for the history fetch and the socket handshake.
    #[prop(into)]
    token: Signal<Option<String>>,
) -> impl IntoView {
    let client = StoredValue::new(ChatClient::new());
    let state = client.with_value(ChatClient::state);

    let input = RwSignal::new(String::new());
    let messages_ref = NodeRef::<leptos::html::Div>::new();

    // Drive the session from the props. `enable` is idempotent, so this
    // effect re-running with unchanged inputs is harmless; a project switch
    // replaces the session and anything else tears it down.
    Effect::new(move || {
        let enabled = is_chat_enabled.get();
        let project = project_id.get();
        let user = current_user.get();
        let bearer = token.get();
        match (enabled, project, user, bearer) {
            (true, Some(project), Some(user), Some(bearer)) => {
                client.with_value(|c| c.enable(&project, &bearer, user));
            }
            _ => client.with_value(ChatClient::disable),
        }
    });

    on_cleanup(move || client.with_value(ChatClient::disable));

    // Keep the newest message in view.
    {
        let state = state.clone();
        Effect::new(move || {
            let _ = state.with(|s| s.buffer.len());

            #[cfg(feature = "hydrate")]
            {
                if let Some(el) = messages_ref.get() {
                    let scroll_height = el.scroll_height();
                    el.set_scroll_top(scroll_height);
                }
            }
        });
    }

    let do_send = move || {
        let text = input.get();
        if client.with_value(|c| c.send(&text)) {
            input.set(String::new());
        }
    };

    let on_click = move |_| do_send();

    let on_keydown = move |ev: leptos::ev::KeyboardEvent| {
        if ev.key() == "Enter" && !ev.shift_key() {
            ev.prevent_default();
            do_send();
        }
    };

    let body = {
        let state = state.clone();
        move || {
            if !is_chat_enabled.get() {
                return view! {
                    <div class="chat-panel__disabled">
                        "Chat is unavailable: the project is closed, or you are not its owner or a listed co-worker."
                    </div>
                }
                .into_any();
            }

            let status_state = state.clone();
            let label_state = state.clone();
            let list_state = state.clone();
            let gate_state = state.clone();
            let button_state = state.clone();

            view! {
                <div class="chat-panel__status">
                    <p class=move || status_class(status_state.with(|s| s.connection))>
                        {move || label_state.with(|s| s.connection.status_label())}
                    </p>
                </div>

                <div class="chat-panel__messages" node_ref=messages_ref>
                    {move || {
                        let viewer = current_user.get();
                        list_state.with(|s| {
                            if s.buffer.is_empty() {
                                return view! {
                                    <div class="chat-panel__empty">"No messages yet"</div>
                                }
                                    .into_any();
                            }

                            s.buffer
                                .snapshot()
                                .map(|msg| {
                                    let own =
                                        viewer.as_ref().is_some_and(|user| msg.is_own(user));
                                    let row_class = row_class(msg.is_system(), own);
                                    let name = msg.display_name.clone();
                                    let time = format_message_time(&msg.timestamp);
                                    let content = msg.content.clone();
                                    view! {
                                        <div class=row_class>
                                            <div class="chat-panel__meta">
                                                <span class="chat-panel__author">{name}</span>
                                                <span class="chat-panel__time">{time}</span>
                                            </div>
                                            <div class="chat-panel__bubble">{content}</div>
                                        </div>
                                    }
                                })
                                .collect::<Vec<_>>()
                                .into_any()
                        })
                    }}
                </div>

                <div class="chat-panel__input-row">
                    <input
                        class="chat-panel__input"
                        type="text"
                        placeholder="Type a message"
                        prop:value=move || input.get()
                        on:input=move |ev| input.set(event_target_value(&ev))
                        on:keydown=on_keydown
                        disabled=move || !gate_state.with(|s| s.connection.can_send())
                    />
                    <button
                        class="chat-panel__send"
                        on:click=on_click
                        disabled=move || {
                            !button_state.with(|s| s.connection.can_send())
                                || input.get().trim().is_empty()
                        }
                    >
                        "Send"
                    </button>
                </div>
            }
            .into_any()
        }
    };

    view! { <div class="chat-panel">{body}</div> }
}

fn status_class(connection: ConnectionState) -> &'static str {
    match connection {
        ConnectionState::Connected => "chat-panel__status-line chat-panel__status-line--connected",
        ConnectionState::Connecting => {
            "chat-panel__status-line chat-panel__status-line--connecting"
        }
        ConnectionState::Closed => "chat-panel__status-line chat-panel__status-line--closed",
        ConnectionState::Disabled => "chat-panel__status-line chat-panel__status-line--disabled",
    }
}

fn row_class(system: bool, own: bool) -> &'static str {
    if system {
        "chat-panel__message chat-panel__message--system"
    } else if own {
        "chat-panel__message chat-panel__message--own"
    } else {
        "chat-panel__message chat-panel__message--other"
    }
}
