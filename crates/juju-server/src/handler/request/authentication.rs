use serde::{Deserialize, Serialize};
use validator::Validate;

/// Credentials submitted to `POST /auth/login/`.
#[must_use]
#[derive(Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address the user signs in with.
    #[validate(length(min = 1, max = 254))]
    pub username: String,
    /// Password of the user.
    #[validate(length(min = 1, max = 1000))]
    pub password: String,
}

impl LoginRequest {
    /// Creates a request from a username and password.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fields_are_rejected() {
        assert!(LoginRequest::new("", "secret").validate().is_err());
        assert!(LoginRequest::new("anafrank@gmail.com", "").validate().is_err());
        assert!(LoginRequest::new("anafrank@gmail.com", "456").validate().is_ok());
    }

    #[test]
    fn debug_hides_password() {
        let request = LoginRequest::new("anafrank@gmail.com", "456");
        assert!(!format!("{request:?}").contains("456"));
    }
}
