//! Login and session handlers.

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use juju_postgres::PgClient;

use super::request::LoginRequest;
use super::response::SessionResponse;
use crate::extract::{AuthState, Json, ValidateJson};
use crate::handler::{ErrorKind, Result};
use crate::service::{LoginService, ServiceState};

/// Tracing target for authentication operations.
const TRACING_TARGET: &str = "juju_server::handler::authentication";

/// Exchanges credentials for the user's bearer token.
///
/// Responds with the token as a JSON string. An unknown email and a wrong
/// password both produce the same `400` body.
#[tracing::instrument(skip_all)]
async fn login(
    State(pg_client): State<PgClient>,
    State(login_service): State<LoginService>,
    ValidateJson(request): ValidateJson<LoginRequest>,
) -> Result<(StatusCode, Json<String>)> {
    tracing::trace!(
        target: TRACING_TARGET,
        username = %request.username,
        "Login attempt"
    );

    let mut conn = pg_client.get_connection().await?;
    let token = login_service
        .login(&mut **conn, &request.username, &request.password)
        .await?;

    login_outcome(token)
}

/// Maps the login outcome to the response.
///
/// Every mismatch yields the same bare `400`, so callers cannot tell an
/// unknown email from a wrong password.
fn login_outcome(token: Option<String>) -> Result<(StatusCode, Json<String>)> {
    let Some(token) = token else {
        tracing::warn!(target: TRACING_TARGET, "Login failed");
        return Err(ErrorKind::BadRequest.with_resource("authentication"));
    };

    tracing::info!(target: TRACING_TARGET, "Login succeeded");
    Ok((StatusCode::OK, Json(token)))
}

/// Returns the claims of the presented, still active bearer token.
#[tracing::instrument(skip_all, fields(user_id = %auth_state.user_id))]
async fn session(auth_state: AuthState) -> Result<(StatusCode, Json<SessionResponse>)> {
    tracing::debug!(
        target: TRACING_TARGET,
        token_id = %auth_state.token_id,
        "Session inspected"
    );

    Ok((StatusCode::OK, Json(auth_state.0.into())))
}

/// Returns a [`Router`] with all authentication routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/auth/login/", post(login))
        .route("/auth/session/", get(session))
}

#[cfg(test)]
mod tests {
    use axum::body::{Bytes, to_bytes};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use jiff::{SignedDuration, Timestamp};
    use juju_postgres::types::UserRole;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::handler::test::{TEST_SECRET, create_test_server_with_router};
    use crate::service::auth::in_memory::{InMemoryStore, test_user};
    use crate::service::{JwtKeys, TokenClaims, TokenIssuer};

    #[tokio::test]
    async fn login_rejects_malformed_body() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let response = server
            .post("/auth/login/")
            .json(&json!({ "username": "anafrank@gmail.com" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let body = response.json::<serde_json::Value>();
        assert_eq!(body["name"], "bad_request");
        Ok(())
    }

    #[tokio::test]
    async fn login_rejects_empty_credentials() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let request = LoginRequest::new("", "");
        let response = server.post("/auth/login/").json(&request).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        Ok(())
    }

    async fn login_body(
        service: &LoginService,
        store: &mut InMemoryStore,
        username: &str,
        password: &str,
    ) -> anyhow::Result<(StatusCode, Bytes)> {
        let token = service.login(store, username, password).await?;
        let response = login_outcome(token).into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, body))
    }

    #[tokio::test]
    async fn login_mismatch_is_indistinguishable() -> anyhow::Result<()> {
        let service = LoginService::new(TokenIssuer::new(JwtKeys::new(TEST_SECRET, None, None)?));
        let mut store = InMemoryStore::with_users([test_user(
            "anafrank@gmail.com",
            "321",
            UserRole::User,
        )]);

        let (status, wrong_password) =
            login_body(&service, &mut store, "anafrank@gmail.com", "123").await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, unknown_user) =
            login_body(&service, &mut store, "nobody@gmail.com", "321").await?;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(wrong_password, unknown_user);

        let body: serde_json::Value = serde_json::from_slice(&wrong_password)?;
        assert_eq!(
            body,
            json!({
                "name": "bad_request",
                "message": "Invalid request data.",
                "resource": "authentication",
            })
        );
        assert!(store.tokens.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn login_success_returns_token_string() -> anyhow::Result<()> {
        let service = LoginService::new(TokenIssuer::new(JwtKeys::new(TEST_SECRET, None, None)?));
        let mut store = InMemoryStore::with_users([test_user(
            "anafrank@gmail.com",
            "321",
            UserRole::User,
        )]);

        let (status, body) = login_body(&service, &mut store, "anafrank@gmail.com", "321").await?;
        assert_eq!(status, StatusCode::OK);

        let token: String = serde_json::from_slice(&body)?;
        assert_eq!(store.tokens[0].token_value, token);
        Ok(())
    }

    #[tokio::test]
    async fn login_reports_unreachable_database() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let request = LoginRequest::new("anafrank@gmail.com", "456");
        let response = server.post("/auth/login/").json(&request).await;
        assert!(response.status_code().is_server_error());
        Ok(())
    }

    #[tokio::test]
    async fn session_requires_bearer() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let response = server.get("/auth/session/").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<serde_json::Value>()["name"], "missing_auth_token");

        let response = server
            .get("/auth/session/")
            .authorization_bearer("not-a-jwt")
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<serde_json::Value>()["name"], "malformed_auth_token");
        Ok(())
    }

    #[tokio::test]
    async fn session_rejects_expired_token() -> anyhow::Result<()> {
        let server = create_test_server_with_router(|_| routes())?;

        let user = test_user("anafrank@gmail.com", "456", UserRole::User);
        let issued_at = Timestamp::now() - SignedDuration::from_hours(2);
        let claims = TokenClaims::new(
            &user,
            Uuid::now_v7(),
            issued_at,
            issued_at + SignedDuration::from_mins(60),
        );
        let token = JwtKeys::new(TEST_SECRET, None, None)?.encode(&claims)?;

        let response = server.get("/auth/session/").authorization_bearer(token).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }
}
