//! localStorage-backed theme persistence.

use crate::ui_model::Theme;

const THEME_KEY: &str = "tiltbot.theme.v1";

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

fn local_storage_get_string(key: &str) -> Option<String> {
    local_storage().and_then(|s| s.get_item(key).ok().flatten())
}

fn local_storage_set_string(key: &str, value: &str) {
    if let Some(s) = local_storage() {
        let _ = s.set_item(key, value);
    }
}

/// Saved theme, falling back to the OS color-scheme preference.
pub(super) fn load_theme() -> Theme {
    if let Some(theme) = local_storage_get_string(THEME_KEY)
        .as_deref()
        .and_then(Theme::parse)
    {
        return theme;
    }
    let prefers_dark = web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|m| m.matches())
        .unwrap_or(false);
    if prefers_dark {
        Theme::Dark
    } else {
        Theme::Light
    }
}

pub(super) fn save_theme(theme: Theme) {
    local_storage_set_string(THEME_KEY, theme.as_attr());
}

pub(super) fn apply_theme_to_document(theme: Theme) {
    let Some(doc) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(el) = doc.document_element() else {
        return;
    };
    let _ = el.set_attribute("data-theme", theme.as_attr());
}
