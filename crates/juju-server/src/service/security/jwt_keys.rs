//! Symmetric HS256 signing keys for bearer tokens.
//!
//! The secret is read once at startup, either inline from `JWT_SECRET` or
//! from the file named by `JWT_SECRET_FILEPATH`, and shared by the minting
//! and verification paths through a cheaply cloneable [`JwtKeys`] handle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tracing target for key loading and token signing.
const TRACING_TARGET: &str = "juju_server::service::jwt_keys";

/// Minimum accepted secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Signing secret source plus optional issuer and audience.
#[derive(Clone, Default, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct JwtKeysConfig {
    /// Inline HS256 signing secret (at least 32 bytes)
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "jwt-secret", env = "JWT_SECRET", hide_env_values = true)
    )]
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// File containing the HS256 signing secret
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "jwt-secret-filepath", env = "JWT_SECRET_FILEPATH")
    )]
    #[serde(default)]
    pub jwt_secret_filepath: Option<PathBuf>,

    /// Value of the `iss` claim, checked on verification when set
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "jwt-issuer", env = "JWT_ISSUER")
    )]
    #[serde(default)]
    pub jwt_issuer: Option<String>,

    /// Value of the `aud` claim, checked on verification when set
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long = "jwt-audience", env = "JWT_AUDIENCE")
    )]
    #[serde(default)]
    pub jwt_audience: Option<String>,
}

impl JwtKeysConfig {
    /// Creates a configuration with an inline secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: Some(secret.into()),
            ..Self::default()
        }
    }

    /// Creates a configuration reading the secret from a file.
    pub fn with_secret_file(path: impl AsRef<Path>) -> Self {
        Self {
            jwt_secret_filepath: Some(path.as_ref().to_path_buf()),
            ..Self::default()
        }
    }
}

impl fmt::Debug for JwtKeysConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeysConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "***"))
            .field("jwt_secret_filepath", &self.jwt_secret_filepath)
            .field("jwt_issuer", &self.jwt_issuer)
            .field("jwt_audience", &self.jwt_audience)
            .finish()
    }
}

/// Keys used to sign and verify bearer tokens.
#[derive(Clone)]
pub struct JwtKeys {
    inner: Arc<JwtKeysInner>,
}

struct JwtKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: Option<String>,
    audience: Option<String>,
}

impl JwtKeys {
    /// Signing algorithm of every token.
    pub const ALGORITHM: Algorithm = Algorithm::HS256;

    /// Creates keys from the configured secret source.
    ///
    /// Exactly one of `jwt_secret` and `jwt_secret_filepath` must be set.
    pub async fn from_config(config: &JwtKeysConfig) -> Result<Self> {
        let secret = match (&config.jwt_secret, &config.jwt_secret_filepath) {
            (Some(secret), None) => secret.as_bytes().to_vec(),
            (None, Some(path)) => Self::load_secret(path).await?,
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "set either JWT_SECRET or JWT_SECRET_FILEPATH, not both",
                ));
            }
            (None, None) => {
                return Err(Error::config(
                    "a signing secret is required, set JWT_SECRET or JWT_SECRET_FILEPATH",
                ));
            }
        };

        let keys = Self::new(
            &secret,
            config.jwt_issuer.clone(),
            config.jwt_audience.clone(),
        )?;

        tracing::info!(
            target: TRACING_TARGET,
            issuer = ?keys.issuer(),
            audience = ?keys.audience(),
            "Signing keys loaded",
        );

        Ok(keys)
    }

    /// Creates keys from a raw secret.
    pub fn new(
        secret: impl AsRef<[u8]>,
        issuer: Option<String>,
        audience: Option<String>,
    ) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes, got {}",
                secret.len()
            )));
        }

        let inner = JwtKeysInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.filter(|s| !s.is_empty()),
            audience: audience.filter(|s| !s.is_empty()),
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    async fn load_secret(path: &Path) -> Result<Vec<u8>> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            "Loading signing secret from file",
        );

        let mut secret = tokio::fs::read(path).await.map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "Failed to read signing secret file",
            );
            Error::file_system("failed to read signing secret file").with_source(e)
        })?;

        // Editors usually leave a trailing newline.
        let trimmed_len = secret.trim_ascii_end().len();
        secret.truncate(trimmed_len);

        Ok(secret)
    }

    /// Returns the key used to sign tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns the key used to verify tokens.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Returns the configured `iss` claim.
    #[inline]
    pub fn issuer(&self) -> Option<&str> {
        self.inner.issuer.as_deref()
    }

    /// Returns the configured `aud` claim.
    #[inline]
    pub fn audience(&self) -> Option<&str> {
        self.inner.audience.as_deref()
    }

    /// Returns the validation rules matching how tokens are minted.
    pub fn validation(&self) -> Validation {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.set_required_spec_claims(&["exp", "sub"]);

        if let Some(issuer) = self.issuer() {
            validation.set_issuer(&[issuer]);
        }

        if let Some(audience) = self.audience() {
            validation.set_audience(&[audience]);
        }

        validation
    }

    /// Signs `claims` into a compact JWT.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String> {
        let header = Header::new(Self::ALGORITHM);
        jsonwebtoken::encode(&header, claims, self.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "Failed to sign token",
            );
            Error::internal("jwt", "failed to sign token").with_source(e)
        })
    }

    /// Verifies the signature, expiry, issuer and audience of `token`.
    pub fn decode<T: DeserializeOwned>(
        &self,
        token: &str,
    ) -> std::result::Result<T, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<T>(token, self.decoding_key(), &self.validation())
            .map(|data| data.claims)
    }
}

impl fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtKeys")
            .field("algorithm", &Self::ALGORITHM)
            .field("issuer", &self.inner.issuer)
            .field("audience", &self.inner.audience)
            .finish_non_exhaustive()
    }
}
