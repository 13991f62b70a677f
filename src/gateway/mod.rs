//! HTTP boundary: translates gate decisions into axum responses.

pub mod guard;

pub use guard::{guarded, mtls_guard};
