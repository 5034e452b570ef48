//! Solve Page

use leptos::prelude::*;
use wasm_bindgen::{JsCast, prelude::Closure};

use crate::api::{self, ChatMessage, LogEntry, ModelEntry, ReasoningStep, append_entry, seed_entries};
use crate::components::{MessageBubble, StepLine};

const KEY_HELP: &str = "Please add your Groq API key in the sidebar to continue.";
const INTERRUPTED: &str = "The connection closed before an answer arrived. Please try again.";

/// Route one server frame into the page signals
fn apply_server_frame(
    text: &str,
    set_messages: WriteSignal<Vec<LogEntry>>,
    set_steps: WriteSignal<Vec<ReasoningStep>>,
    set_loading: WriteSignal<bool>,
) {
    let Ok(frame) = serde_json::from_str::<serde_json::Value>(text) else {
        return;
    };

    match frame["type"].as_str() {
        Some("thought") => set_steps.update(|steps| {
            steps.push(ReasoningStep {
                kind: "thought".into(),
                text: frame["text"].as_str().unwrap_or_default().to_string(),
            });
        }),
        Some("action") => set_steps.update(|steps| {
            steps.push(ReasoningStep {
                kind: "action".into(),
                text: format!(
                    "{}: {}",
                    frame["tool"].as_str().unwrap_or_default(),
                    frame["input"].as_str().unwrap_or_default()
                ),
            });
        }),
        Some("observation") => set_steps.update(|steps| {
            steps.push(ReasoningStep {
                kind: "observation".into(),
                text: frame["output"].as_str().unwrap_or_default().to_string(),
            });
        }),
        Some("final") => {
            set_messages.update(|msgs| {
                append_entry(
                    msgs,
                    ChatMessage {
                        role: "assistant".into(),
                        content: frame["content"].as_str().unwrap_or("No response").to_string(),
                    },
                );
            });
            set_loading.set(false);
        }
        Some("error") => {
            set_messages.update(|msgs| {
                append_entry(
                    msgs,
                    ChatMessage {
                        role: "assistant".into(),
                        content: frame["error"].as_str().unwrap_or("Request failed").to_string(),
                    },
                );
            });
            set_loading.set(false);
        }
        _ => {}
    }
}

/// Settle the page when the socket closes. If no final or error frame made
/// it through, the viewer gets told and the page unlocks.
fn apply_socket_close(
    loading: ReadSignal<bool>,
    set_messages: WriteSignal<Vec<LogEntry>>,
    set_loading: WriteSignal<bool>,
) {
    if !loading.get_untracked() {
        return;
    }
    set_messages.update(|msgs| {
        append_entry(
            msgs,
            ChatMessage {
                role: "error".into(),
                content: INTERRUPTED.into(),
            },
        );
    });
    set_loading.set(false);
}

#[component]
pub fn SolvePage() -> impl IntoView {
    let (session_id, set_session_id) = signal(String::new());
    let (messages, set_messages) = signal(Vec::<LogEntry>::new());
    let (steps, set_steps) = signal(Vec::<ReasoningStep>::new());
    let (input, set_input) = signal(String::new());
    let (loading, set_loading) = signal(false);

    // Sidebar settings
    let (api_key, set_api_key) = signal(String::new());
    let (model, set_model) = signal("gemma2-9b-it".to_string());
    let (temperature, set_temperature) = signal(0.2_f32);
    let (show_reasoning, set_show_reasoning) = signal(true);

    let (models, set_models) = signal(Vec::<ModelEntry>::new());
    let (examples, set_examples) = signal(Vec::<String>::new());
    let (has_default_key, set_has_default_key) = signal(false);
    let (tab, set_tab) = signal("ask".to_string());

    let key_available = move || !api_key.get().trim().is_empty() || has_default_key.get();

    // Bootstrap: server config, catalogs, and a fresh session
    leptos::task::spawn_local(async move {
        if let Ok(has_key) = api::fetch_config().await {
            set_has_default_key.set(has_key);
        }
        if let Ok(catalog) = api::fetch_models().await {
            set_models.set(catalog);
        }
        if let Ok(canned) = api::fetch_examples().await {
            set_examples.set(canned);
        }
        match api::create_session().await {
            Ok((id, transcript)) => {
                set_session_id.set(id);
                set_messages.set(seed_entries(transcript));
            }
            Err(e) => set_messages.update(|msgs| {
                append_entry(
                    msgs,
                    ChatMessage {
                        role: "error".into(),
                        content: e,
                    },
                );
            }),
        }
    });

    // Single submission path. The example buttons and the free-text form
    // both land here, so a question is appended exactly once either way.
    let submit = move |question: String| {
        let question = question.trim().to_string();
        if question.is_empty() || loading.get() || session_id.get().is_empty() {
            return;
        }

        let key = api_key.get();
        if key.trim().is_empty() && !has_default_key.get() {
            set_messages.update(|msgs| {
                append_entry(
                    msgs,
                    ChatMessage {
                        role: "assistant".into(),
                        content: KEY_HELP.into(),
                    },
                );
            });
            return;
        }

        set_messages.update(|msgs| {
            append_entry(
                msgs,
                ChatMessage {
                    role: "user".into(),
                    content: question.clone(),
                },
            );
        });
        set_input.set(String::new());
        set_steps.set(Vec::new());
        set_loading.set(true);

        let ws = match web_sys::WebSocket::new(&api::ws_url()) {
            Ok(ws) => ws,
            Err(_) => {
                set_messages.update(|msgs| {
                    append_entry(
                        msgs,
                        ChatMessage {
                            role: "error".into(),
                            content: "Could not reach the solver".into(),
                        },
                    );
                });
                set_loading.set(false);
                return;
            }
        };

        let request = serde_json::json!({
            "session_id": session_id.get(),
            "question": question,
            "api_key": if key.trim().is_empty() { None } else { Some(key) },
            "model": model.get(),
            "temperature": temperature.get(),
            "show_reasoning": show_reasoning.get(),
        })
        .to_string();

        let ws_send = ws.clone();
        let onopen = Closure::<dyn FnMut()>::new(move || {
            let _ = ws_send.send_with_str(&request);
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        let onmessage = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
            move |event: web_sys::MessageEvent| {
                if let Some(text) = event.data().as_string() {
                    apply_server_frame(&text, set_messages, set_steps, set_loading);
                }
            },
        );
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let onerror = Closure::<dyn FnMut()>::new(move || {
            set_loading.set(false);
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onerror.forget();

        // A clean close mid-solve (server restart, proxy timeout) fires
        // only this event; without it the page stays locked forever.
        let onclose = Closure::<dyn FnMut()>::new(move || {
            apply_socket_close(loading, set_messages, set_loading);
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();
    };

    view! {
        <div class="solve">
            <aside class="sidebar">
                <h2>"Settings"</h2>
                <div class="field">
                    <label>"Groq API Key"</label>
                    <input
                        type="password"
                        placeholder="gsk_..."
                        prop:value=move || api_key.get()
                        on:input=move |ev| set_api_key.set(event_target_value(&ev))
                    />
                    <Show when=move || has_default_key.get()>
                        <p class="hint">"A server key is configured; yours is optional."</p>
                    </Show>
                </div>
                <div class="field">
                    <label>"Model"</label>
                    <select on:change=move |ev| set_model.set(event_target_value(&ev))>
                        <For
                            each=move || models.get()
                            key=|m| m.id.clone()
                            children=move |m| {
                                let selected = model.get_untracked() == m.id;
                                view! {
                                    <option value=m.id.clone() selected=selected>
                                        {m.label.clone()}
                                    </option>
                                }
                            }
                        />
                    </select>
                </div>
                <div class="field">
                    <label>
                        "Temperature: " {move || format!("{:.1}", temperature.get())}
                    </label>
                    <input
                        type="range"
                        min="0"
                        max="1"
                        step="0.1"
                        prop:value=move || temperature.get().to_string()
                        on:input=move |ev| {
                            set_temperature.set(event_target_value(&ev).parse().unwrap_or(0.2));
                        }
                    />
                </div>
                <div class="field">
                    <label>
                        <input
                            type="checkbox"
                            prop:checked=move || show_reasoning.get()
                            on:change=move |ev| set_show_reasoning.set(event_target_checked(&ev))
                        />
                        "Show reasoning steps"
                    </label>
                </div>
            </aside>

            <main class="solve-main">
                <div class="messages">
                    <For
                        each=move || messages.get()
                        key=|entry| entry.id
                        children=move |entry| view! { <MessageBubble message=entry.message /> }
                    />
                    <Show when=move || loading.get()>
                        <div class="message loading">"Solving..."</div>
                    </Show>
                </div>

                <Show when=move || show_reasoning.get() && !steps.get().is_empty()>
                    <div class="reasoning">
                        <h3>"Reasoning"</h3>
                        <For
                            each=move || steps.get().into_iter().enumerate()
                            key=|(i, _)| *i
                            children=move |(_, step)| view! { <StepLine step=step /> }
                        />
                    </div>
                </Show>

                <Show
                    when=key_available
                    fallback=|| {
                        view! {
                            <div class="key-help">
                                <p>{KEY_HELP}</p>
                            </div>
                        }
                    }
                >
                    <div class="tabs">
                        <button
                            class=move || if tab.get() == "ask" { "tab active" } else { "tab" }
                            on:click=move |_| set_tab.set("ask".into())
                        >
                            "Ask a question"
                        </button>
                        <button
                            class=move || if tab.get() == "examples" { "tab active" } else { "tab" }
                            on:click=move |_| set_tab.set("examples".into())
                        >
                            "Examples"
                        </button>
                    </div>

                    <Show when=move || tab.get() == "examples">
                        <div class="examples">
                            <For
                                each=move || examples.get()
                                key=|e| e.clone()
                                children=move |example| {
                                    let question = example.clone();
                                    view! {
                                        <button
                                            class="example"
                                            on:click=move |_| submit(question.clone())
                                            disabled=move || loading.get()
                                        >
                                            {example.clone()}
                                        </button>
                                    }
                                }
                            />
                        </div>
                    </Show>

                    <Show when=move || tab.get() == "ask">
                        <div class="input-area">
                            <textarea
                                placeholder="Ask a math question..."
                                prop:value=move || input.get()
                                on:input=move |ev| set_input.set(event_target_value(&ev))
                                on:keydown=move |ev| {
                                    if ev.key() == "Enter" && !ev.shift_key() {
                                        ev.prevent_default();
                                        submit(input.get());
                                    }
                                }
                            />
                            <button
                                on:click=move |_| submit(input.get())
                                disabled=move || loading.get()
                            >
                                {move || if loading.get() { "..." } else { "Solve" }}
                            </button>
                        </div>
                    </Show>
                </Show>
            </main>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_frame_appends_answer_and_unlocks() {
        let (messages, set_messages) = signal(Vec::<LogEntry>::new());
        let (_, set_steps) = signal(Vec::<ReasoningStep>::new());
        let (loading, set_loading) = signal(true);

        apply_server_frame(
            r#"{"type":"final","content":"The answer is 4."}"#,
            set_messages,
            set_steps,
            set_loading,
        );

        assert!(!loading.get_untracked());
        let log = messages.get_untracked();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message.role, "assistant");
        assert_eq!(log[0].message.content, "The answer is 4.");
    }

    #[test]
    fn test_reasoning_frames_feed_steps() {
        let (_, set_messages) = signal(Vec::<LogEntry>::new());
        let (steps, set_steps) = signal(Vec::<ReasoningStep>::new());
        let (loading, set_loading) = signal(true);

        apply_server_frame(
            r#"{"type":"thought","text":"I should use the calculator"}"#,
            set_messages,
            set_steps,
            set_loading,
        );
        apply_server_frame(
            r#"{"type":"action","tool":"calculator","input":"2 + 2"}"#,
            set_messages,
            set_steps,
            set_loading,
        );

        let feed = steps.get_untracked();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].kind, "thought");
        assert_eq!(feed[1].text, "calculator: 2 + 2");
        // Intermediate frames never unlock the page
        assert!(loading.get_untracked());
    }

    #[test]
    fn test_close_during_solve_unlocks_with_notice() {
        let (messages, set_messages) = signal(Vec::<LogEntry>::new());
        let (loading, set_loading) = signal(true);

        apply_socket_close(loading, set_messages, set_loading);

        assert!(!loading.get_untracked());
        let log = messages.get_untracked();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message.content, INTERRUPTED);
    }

    #[test]
    fn test_close_after_answer_is_silent() {
        let (messages, set_messages) = signal(Vec::<LogEntry>::new());
        let (loading, set_loading) = signal(false);

        apply_socket_close(loading, set_messages, set_loading);

        assert!(messages.get_untracked().is_empty());
        assert!(!loading.get_untracked());
    }
}
