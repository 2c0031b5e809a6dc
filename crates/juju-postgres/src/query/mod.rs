//! Repository traits implemented for [`PgConnection`].
//!
//! [`PgConnection`]: crate::PgConnection

mod token;
mod user;

pub use token::TokenRepository;
pub use user::UserRepository;
