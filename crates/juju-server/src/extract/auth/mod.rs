//! Bearer token extraction and session verification.

mod auth_state;
mod jwt_header;

pub use self::auth_state::AuthState;
pub use self::jwt_header::AuthHeader;
