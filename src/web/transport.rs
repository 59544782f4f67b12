//! Push-first transport with an HTTP polling fallback.
//!
//! The backend pushes `config`/`telemetry` envelopes over a WebSocket and
//! mirrors the same state at `GET /status`. We dial the socket at startup;
//! while it is down we poll every 250ms and re-dial every few seconds.
//! Commands travel over whichever channel is up.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use crate::protocol::{Command, ServerEvent, StatusSnapshot};
use crate::ui_model::ConnectionEvent;

use super::console_log;

const POLL_INTERVAL_MS: i32 = 250;
const REDIAL_DELAY_MS: i32 = 3_000;

/// Callbacks into the UI. All of them run on the main thread from timer or
/// socket callbacks.
pub(super) struct Handlers {
    pub(super) on_event: Rc<dyn Fn(ServerEvent)>,
    pub(super) on_conn: Rc<dyn Fn(ConnectionEvent)>,
    pub(super) on_protocol_error: Rc<dyn Fn(String)>,
}

#[derive(Clone)]
pub(super) struct Transport {
    inner: Rc<RefCell<Inner>>,
}

struct Inner {
    handlers: Rc<Handlers>,
    socket: Option<WebSocket>,
    socket_open: bool,
    poll_timer: Option<i32>,
    redial_timer: Option<i32>,
}

impl Transport {
    pub(super) fn new(handlers: Handlers) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                handlers: Rc::new(handlers),
                socket: None,
                socket_open: false,
                poll_timer: None,
                redial_timer: None,
            })),
        }
    }

    fn handlers(&self) -> Rc<Handlers> {
        Rc::clone(&self.inner.borrow().handlers)
    }

    /// Seed the UI with one `/status` snapshot (errors ignored at startup),
    /// then dial the push channel.
    pub(super) fn start(&self) {
        let transport = self.clone();
        spawn_local(async move {
            if let Ok(body) = fetch_text("/status").await {
                let _ = transport.apply_snapshot(&body);
            }
        });
        self.dial();
    }

    fn dial(&self) {
        if self.inner.borrow().socket.is_some() {
            return;
        }

        let socket = match push_url().and_then(|url| {
            WebSocket::new(&url).map_err(|_| format!("WebSocket::new({url}) threw"))
        }) {
            Ok(s) => s,
            Err(_) => {
                (self.handlers().on_conn)(ConnectionEvent::PushUnavailable);
                self.start_polling();
                return;
            }
        };

        let handlers = self.handlers();
        let onmessage = Closure::<dyn FnMut(_)>::new(move |e: MessageEvent| {
            let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() else {
                return;
            };
            match ServerEvent::parse(&String::from(txt)) {
                Ok(Some(event)) => (handlers.on_event)(event),
                Ok(None) => {}
                Err(err) => (handlers.on_protocol_error)(err),
            }
        });
        socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        onmessage.forget();

        let transport = self.clone();
        let onopen = Closure::<dyn FnMut()>::new(move || {
            console_log("[tiltbot] push channel open");
            transport.inner.borrow_mut().socket_open = true;
            transport.stop_polling();
            let handlers = transport.handlers();
            (handlers.on_conn)(ConnectionEvent::PushOpened);
            transport.send(&Command::GetInitialState);
        });
        socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        onopen.forget();

        let transport = self.clone();
        let onclose = Closure::<dyn FnMut(_)>::new(move |e: CloseEvent| {
            console_log(&format!(
                "[tiltbot] push channel closed: code={} reason={}",
                e.code(),
                e.reason()
            ));
            let was_open = {
                let mut inner = transport.inner.borrow_mut();
                let was_open = inner.socket_open;
                inner.socket = None;
                inner.socket_open = false;
                was_open
            };
            let handlers = transport.handlers();
            if was_open {
                (handlers.on_conn)(ConnectionEvent::PushClosed { reason: e.reason() });
            } else {
                (handlers.on_conn)(ConnectionEvent::PushFailed {
                    reason: format!("close code {}", e.code()),
                });
            }
            transport.start_polling();
            transport.schedule_redial();
        });
        socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
        onclose.forget();

        // Errors are always followed by a close event; onclose owns recovery.

        self.inner.borrow_mut().socket = Some(socket);
    }

    fn start_polling(&self) {
        if self.inner.borrow().poll_timer.is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };

        let transport = self.clone();
        let cb = Closure::<dyn FnMut()>::new(move || transport.poll_once());
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            POLL_INTERVAL_MS,
        ) {
            Ok(id) => {
                cb.forget();
                self.inner.borrow_mut().poll_timer = Some(id);
            }
            Err(_) => {
                (self.handlers().on_conn)(ConnectionEvent::PollFailed {
                    reason: "failed to start poll timer".to_string(),
                });
            }
        }
    }

    fn stop_polling(&self) {
        let timer = self.inner.borrow_mut().poll_timer.take();
        if let Some(id) = timer {
            if let Some(w) = web_sys::window() {
                w.clear_interval_with_handle(id);
            }
        }
    }

    fn poll_once(&self) {
        let transport = self.clone();
        spawn_local(async move {
            let handlers = transport.handlers();
            match fetch_text("/status").await {
                Ok(body) => match transport.apply_snapshot(&body) {
                    Ok(()) => (handlers.on_conn)(ConnectionEvent::PollSucceeded),
                    Err(err) => (handlers.on_conn)(ConnectionEvent::PollFailed { reason: err }),
                },
                Err(err) => (handlers.on_conn)(ConnectionEvent::PollFailed { reason: err }),
            }
        });
    }

    fn apply_snapshot(&self, body: &str) -> Result<(), String> {
        let snapshot: StatusSnapshot =
            serde_json::from_str(body).map_err(|e| format!("bad status payload: {e}"))?;
        let handlers = self.handlers();
        if let Some(config) = snapshot.config {
            (handlers.on_event)(ServerEvent::Config(config));
        }
        if let Some(telemetry) = snapshot.telemetry {
            (handlers.on_event)(ServerEvent::Telemetry(telemetry));
        }
        Ok(())
    }

    fn schedule_redial(&self) {
        if self.inner.borrow().redial_timer.is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            return;
        };

        let transport = self.clone();
        let cb = Closure::once_into_js(move || {
            transport.inner.borrow_mut().redial_timer = None;
            if transport.inner.borrow().socket.is_none() {
                transport.dial();
            }
        });
        if let Ok(id) = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                REDIAL_DELAY_MS,
            )
        {
            self.inner.borrow_mut().redial_timer = Some(id);
        }
    }

    /// Tear down timers and the socket. Handlers registered on a socket that
    /// is being dropped are detached first so close events from our own
    /// teardown do not restart polling.
    pub(super) fn stop(&self) {
        self.stop_polling();
        let (socket, redial) = {
            let mut inner = self.inner.borrow_mut();
            inner.socket_open = false;
            (inner.socket.take(), inner.redial_timer.take())
        };
        if let Some(socket) = socket {
            socket.set_onopen(None);
            socket.set_onmessage(None);
            socket.set_onclose(None);
            let _ = socket.close();
        }
        if let Some(id) = redial {
            if let Some(w) = web_sys::window() {
                w.clear_timeout_with_handle(id);
            }
        }
    }

    /// Dispatch one command: push envelope if the socket is open, otherwise
    /// the command's HTTP GET form. Commands with no GET form are dropped
    /// while the socket is down.
    pub(super) fn send(&self, cmd: &Command) {
        let socket = {
            let inner = self.inner.borrow();
            if inner.socket_open {
                inner.socket.clone()
            } else {
                None
            }
        };
        if let Some(socket) = socket {
            if socket.ready_state() == WebSocket::OPEN
                && socket.send_with_str(&cmd.envelope()).is_ok()
            {
                return;
            }
        }

        let Some(path) = cmd.http_path() else {
            return;
        };
        let query = cmd.query_string();
        let url = if query.is_empty() {
            path.to_string()
        } else {
            format!("{path}?{query}")
        };
        spawn_local(async move {
            let _ = fetch_text(&url).await;
        });
    }
}

fn push_url() -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    let location = window.location();
    let protocol = location.protocol().map_err(|_| "location.protocol threw")?;
    let host = location.host().map_err(|_| "location.host threw")?;
    let scheme = if protocol == "https:" { "wss:" } else { "ws:" };
    Ok(format!("{scheme}//{host}/ws"))
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let window = web_sys::window().ok_or("no window")?;
    let resp = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|_| format!("fetch {url} failed"))?;
    let resp: web_sys::Response = resp
        .dyn_into()
        .map_err(|_| "fetch returned a non-Response")?;
    if !resp.ok() {
        return Err(format!("HTTP {} from {url}", resp.status()));
    }
    let body = JsFuture::from(resp.text().map_err(|_| "response body unavailable")?)
        .await
        .map_err(|_| "reading response body failed")?;
    body.as_string()
        .ok_or_else(|| "response body is not text".to_string())
}
