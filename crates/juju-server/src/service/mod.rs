//! Application state and dependency injection.

pub mod auth;
mod config;
mod security;

use juju_postgres::PgClient;

pub use crate::service::auth::{LoginService, TOKEN_LIFETIME, TokenClaims, TokenIssuer};
pub use crate::service::config::{ServiceConfig, ServiceConfigBuilder};
pub use crate::service::security::{JwtKeys, JwtKeysConfig, MIN_SECRET_LEN};
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    // External services:
    pub postgres: PgClient,

    // Internal services:
    pub jwt_keys: JwtKeys,
    pub login_service: LoginService,
}

impl ServiceState {
    /// Loads the signing keys, then connects to the database and migrates it.
    pub async fn new(service_config: &ServiceConfig) -> Result<Self> {
        let jwt_keys = service_config.load_jwt_keys().await?;
        let postgres = service_config.connect_postgres().await?;
        Ok(Self::from_parts(postgres, jwt_keys))
    }

    /// Assembles the state from an existing client and keys.
    pub fn from_parts(postgres: PgClient, jwt_keys: JwtKeys) -> Self {
        let login_service = LoginService::new(TokenIssuer::new(jwt_keys.clone()));

        Self {
            postgres,
            jwt_keys,
            login_service,
        }
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

// External services:
impl_di!(postgres: PgClient);

// Internal services:
impl_di!(jwt_keys: JwtKeys);
impl_di!(login_service: LoginService);
