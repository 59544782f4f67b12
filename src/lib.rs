//! Browser dashboard and remote-control console for a two-wheel
//! self-balancing robot.
//!
//! This crate is intentionally a stub by default so it builds (and its unit
//! tests run) on native targets without requiring wasm toolchains.
//!
//! Enable the real app with: `--features web` (and a wasm32 target).
//!
//! Everything that does not need a DOM lives in the host-testable modules
//! below; the wasm-only `web` module is a thin adapter over them.

pub mod chart;
pub mod float_fmt;
pub mod protocol;
pub mod state;
pub mod ui_model;
pub mod wireframe;

/// Placeholder function for non-web (or non-wasm) builds.
#[cfg(not(all(feature = "web", target_arch = "wasm32")))]
pub fn placeholder() {
    // No-op.
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
mod web;

#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::start;
