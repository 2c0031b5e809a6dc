//! Response bodies returned by handlers.

mod authentication;
mod errors;
mod monitors;

pub use authentication::SessionResponse;
pub use errors::ErrorResponse;
pub use monitors::{MonitorStatusResponse, ServiceStatus};
