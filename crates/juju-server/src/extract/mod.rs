//! Request extractors with JSON error bodies.
//!
//! - [`AuthHeader`] decodes and verifies the `Authorization: Bearer` token.
//! - [`AuthState`] additionally checks the token against the token store.
//! - [`Json`] and [`ValidateJson`] replace the axum JSON extractor.

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{AuthHeader, AuthState};
pub use crate::extract::reject::{Json, ValidateJson};

/// Tracing target for bearer token extraction and session checks.
pub const TRACING_TARGET_AUTHENTICATION: &str = "juju_server::extract::auth";
