//! UI Components

use leptos::prelude::*;

/// Plain text error banner, hidden when there is no message
#[component]
pub fn ErrorBanner(message: Signal<Option<String>>) -> impl IntoView {
    move || {
        message
            .get()
            .map(|text| view! { <div class="error">{text}</div> })
    }
}
