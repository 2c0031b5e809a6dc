//! Token signing keys.

mod jwt_keys;

pub use jwt_keys::{JwtKeys, JwtKeysConfig, MIN_SECRET_LEN};
