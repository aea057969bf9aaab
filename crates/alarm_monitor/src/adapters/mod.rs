// Rust guideline compliant 2026-10-19

//! Adapters (secondary ports) for the alarm monitor binary.
//!
//! Each sub-module implements one port trait defined in the `domain` crate,
//! or renders the view's rows. Adapters stay isolated from view logic.

pub mod demo_api;
pub mod http_api;
pub mod log_renderer;
pub mod scripted_dialog;
pub mod static_session;
