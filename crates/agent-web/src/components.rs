//! UI Components

use leptos::prelude::*;

use crate::api::{ChatMessage, ReasoningStep};

/// Message bubble component
#[component]
pub fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let class = format!("message message-{}", message.role);

    view! {
        <div class=class>
            <span class="role">{message.role.clone()}</span>
            <p class="content">{message.content.clone()}</p>
        </div>
    }
}

/// One line of the live reasoning feed
#[component]
pub fn StepLine(step: ReasoningStep) -> impl IntoView {
    let class = format!("step step-{}", step.kind);
    let label = match step.kind.as_str() {
        "thought" => "Thinking",
        "action" => "Tool call",
        "observation" => "Result",
        _ => "Step",
    };

    view! {
        <div class=class>
            <span class="step-label">{label}</span>
            <pre class="step-text">{step.text.clone()}</pre>
        </div>
    }
}
