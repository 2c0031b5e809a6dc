//! Diesel models for the `users` and `tokens` tables.

mod token;
mod user;

pub use token::{NewToken, Token};
pub use user::User;
