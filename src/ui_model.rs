//! UI models that should be available on both wasm and native.
//!
//! Keeping these out of the wasm-only `web` module allows us to unit-test the
//! connection-mode machine and theme handling on the host.

/// Which transport currently feeds the dashboard. Push and polling are
/// mutually exclusive by construction: every transition that leaves `Push`
/// lands in `Polling` and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    #[default]
    Connecting,
    Push,
    Polling,
}

/// Everything that can move the connection machine or refresh its status
/// line. Fed from transport callbacks; there is exactly one notification
/// path out (the returned [`StatusLine`]).
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionEvent {
    /// Push channel opened (or re-opened).
    PushOpened,
    /// Push channel dropped after being up.
    PushClosed { reason: String },
    /// Push connection attempt failed.
    PushFailed { reason: String },
    /// Push transport cannot be constructed at all.
    PushUnavailable,
    /// A `/status` poll round-trip succeeded.
    PollSucceeded,
    /// A `/status` poll failed; mode is unchanged.
    PollFailed { reason: String },
}

/// One status update: text for the status element, error flag for the banner.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

impl StatusLine {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// The two-state (plus startup) connection machine.
#[derive(Debug, Clone, Default)]
pub struct ConnectionModel {
    mode: ConnectionMode,
}

impl ConnectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Status shown before any event arrives.
    pub fn initial_status() -> StatusLine {
        StatusLine::ok("Connecting...")
    }

    /// Apply one event and produce the status line to display.
    pub fn apply(&mut self, event: ConnectionEvent) -> StatusLine {
        match event {
            ConnectionEvent::PushOpened => {
                self.mode = ConnectionMode::Push;
                StatusLine::ok("Connected")
            }
            ConnectionEvent::PushClosed { reason } => {
                self.mode = ConnectionMode::Polling;
                if reason.is_empty() {
                    StatusLine::error("Disconnected, polling")
                } else {
                    StatusLine::error(format!("Disconnected ({reason}), polling"))
                }
            }
            ConnectionEvent::PushFailed { reason } => {
                self.mode = ConnectionMode::Polling;
                StatusLine::error(format!("Connect error: {reason}, polling"))
            }
            ConnectionEvent::PushUnavailable => {
                self.mode = ConnectionMode::Polling;
                StatusLine::error("WebSocket unavailable, using polling")
            }
            ConnectionEvent::PollSucceeded => match self.mode {
                ConnectionMode::Push => StatusLine::ok("Connected"),
                _ => StatusLine::ok("Connected (polling)"),
            },
            ConnectionEvent::PollFailed { reason } => {
                StatusLine::error(format!("Polling error: {reason}"))
            }
        }
    }
}

/// Light/dark theme, persisted in localStorage and applied as a `data-theme`
/// attribute on the document element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_attr(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Theme::Light => "\u{2600}",
            Theme::Dark => "\u{1f319}",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Only the two stored attribute values parse; everything else is `None`
    /// so the caller can fall back to the OS preference.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_connecting() {
        let model = ConnectionModel::new();
        assert_eq!(model.mode(), ConnectionMode::Connecting);
        assert_eq!(ConnectionModel::initial_status().text, "Connecting...");
    }

    #[test]
    fn push_open_and_loss_are_mutually_exclusive_modes() {
        let mut model = ConnectionModel::new();

        let status = model.apply(ConnectionEvent::PushOpened);
        assert_eq!(model.mode(), ConnectionMode::Push);
        assert_eq!(status.text, "Connected");
        assert!(!status.is_error);

        let status = model.apply(ConnectionEvent::PushClosed {
            reason: String::new(),
        });
        assert_eq!(model.mode(), ConnectionMode::Polling);
        assert!(status.is_error);

        // Reconnect flips straight back.
        let status = model.apply(ConnectionEvent::PushOpened);
        assert_eq!(model.mode(), ConnectionMode::Push);
        assert!(!status.is_error);
    }

    #[test]
    fn connect_failure_falls_back_to_polling() {
        let mut model = ConnectionModel::new();
        let status = model.apply(ConnectionEvent::PushFailed {
            reason: "refused".to_string(),
        });
        assert_eq!(model.mode(), ConnectionMode::Polling);
        assert_eq!(status.text, "Connect error: refused, polling");
        assert!(status.is_error);

        let status = model.apply(ConnectionEvent::PollSucceeded);
        assert_eq!(status.text, "Connected (polling)");
        assert!(!status.is_error);
    }

    #[test]
    fn poll_failure_does_not_change_mode() {
        let mut model = ConnectionModel::new();
        model.apply(ConnectionEvent::PushUnavailable);
        assert_eq!(model.mode(), ConnectionMode::Polling);

        let status = model.apply(ConnectionEvent::PollFailed {
            reason: "timeout".to_string(),
        });
        assert_eq!(model.mode(), ConnectionMode::Polling);
        assert_eq!(status.text, "Polling error: timeout");
        assert!(status.is_error);
    }

    #[test]
    fn theme_round_trips_through_attr() {
        assert_eq!(Theme::parse("dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("light"), Some(Theme::Light));
        assert_eq!(Theme::parse("blue"), None);
        assert_eq!(Theme::Dark.toggle(), Theme::Light);
        assert_eq!(Theme::parse(Theme::Dark.as_attr()), Some(Theme::Dark));
    }
}
