//! Request bodies accepted by handlers.

mod authentication;

pub use authentication::LoginRequest;
