use leptos::prelude::*;

use crate::ui_model::Theme;

#[component]
pub(super) fn Topbar(
    status: ReadSignal<String>,
    status_is_error: ReadSignal<bool>,
    theme: ReadSignal<Theme>,
    set_theme: WriteSignal<Theme>,
) -> impl IntoView {
    view! {
        <header class="app-header">
            <div class="app-header-left">
                <h1 class="brand">"Tiltbot"</h1>
                <span class="subtle">"balancing robot console"</span>
            </div>
            <div class="app-header-right">
                <span class=move || {
                    if status_is_error.get() { "status error" } else { "status" }
                }>{move || status.get()}</span>
                <button
                    class="btn sm ghost"
                    title=move || format!("Theme: {}", theme.get().label())
                    on:click=move |_| set_theme.set(theme.get().toggle())
                >
                    {move || theme.get().icon()}
                    " "
                    {move || theme.get().label()}
                </button>
            </div>
        </header>
    }
}

#[component]
pub(super) fn SystemErrorBanner(
    system_error: ReadSignal<Option<String>>,
    set_system_error: WriteSignal<Option<String>>,
) -> impl IntoView {
    view! {
        <Show when=move || system_error.get().is_some()>
            <div class="error-banner">
                <div class="error-banner-head">
                    <div class="error-banner-title">"Error"</div>
                    <button class="btn sm" on:click=move |_| set_system_error.set(None)>
                        "Dismiss"
                    </button>
                </div>
                <div class="error-banner-body">
                    {move || system_error.get().unwrap_or_default()}
                </div>
            </div>
        </Show>
    }
}

#[component]
pub(super) fn Readout(
    label: &'static str,
    value: impl Fn() -> String + Send + 'static,
) -> impl IntoView {
    view! {
        <div class="readout">
            <div class="readout-label">{label}</div>
            <div class="readout-value">{value}</div>
        </div>
    }
}
