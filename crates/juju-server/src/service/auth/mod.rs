//! Login and bearer token issuance.

#[cfg(test)]
pub(crate) mod in_memory;
mod login_service;
mod token_claims;
mod token_issuer;

pub use login_service::LoginService;
pub use token_claims::TokenClaims;
pub use token_issuer::{TOKEN_LIFETIME, TokenIssuer};
