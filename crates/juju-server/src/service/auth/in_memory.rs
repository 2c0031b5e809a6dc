//! In-memory users and tokens store for exercising the login flow without a
//! database.

use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind};
use juju_postgres::error::DieselError;
use juju_postgres::model::{NewToken, Token, User};
use juju_postgres::query::{TokenRepository, UserRepository};
use juju_postgres::types::UserRole;
use juju_postgres::{PgError, PgResult};
use uuid::Uuid;

/// Returns a user with the given credentials and role.
pub(crate) fn test_user(email: &str, password: &str, role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        name: "Ana".to_string(),
        last_name: "Frank".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
        phone: None,
        created_at: jiff::Timestamp::now().into(),
    }
}

struct UniqueViolation(&'static str);

impl DatabaseErrorInformation for UniqueViolation {
    fn message(&self) -> &str {
        "duplicate key value violates unique constraint"
    }

    fn details(&self) -> Option<&str> {
        None
    }

    fn hint(&self) -> Option<&str> {
        None
    }

    fn table_name(&self) -> Option<&str> {
        Some("tokens")
    }

    fn column_name(&self) -> Option<&str> {
        None
    }

    fn constraint_name(&self) -> Option<&str> {
        Some(self.0)
    }

    fn statement_position(&self) -> Option<i32> {
        None
    }
}

/// Users and tokens kept in vectors.
///
/// `create_token` enforces one active token per user the way the partial
/// unique index does, and `deactivate_token` only flips active rows.
#[derive(Debug, Default)]
pub(crate) struct InMemoryStore {
    pub users: Vec<User>,
    pub tokens: Vec<Token>,
    /// Token recorded by a simulated concurrent login right before the next
    /// `deactivate_token` or `create_token` runs.
    pub concurrent_winner: Option<NewToken>,
}

impl InMemoryStore {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: users.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn active_tokens(&self, user_id: Uuid) -> Vec<&Token> {
        self.tokens
            .iter()
            .filter(|t| t.user_id == user_id && t.is_active)
            .collect()
    }

    pub fn tokens_of(&self, user_id: Uuid) -> Vec<&Token> {
        self.tokens.iter().filter(|t| t.user_id == user_id).collect()
    }

    /// Shifts every token of `user_id` into the past by `by`.
    pub fn age_tokens(&mut self, user_id: Uuid, by: jiff::SignedDuration) {
        for token in self.tokens.iter_mut().filter(|t| t.user_id == user_id) {
            token.issued_at = (jiff::Timestamp::from(token.issued_at) - by).into();
            token.expires_at = (jiff::Timestamp::from(token.expires_at) - by).into();
        }
    }

    fn run_concurrent_login(&mut self) {
        let Some(winner) = self.concurrent_winner.take() else {
            return;
        };

        for token in self
            .tokens
            .iter_mut()
            .filter(|t| t.user_id == winner.user_id)
        {
            token.is_active = false;
        }

        self.tokens.push(into_token(winner));
    }
}

fn into_token(new_token: NewToken) -> Token {
    Token {
        id: new_token.id,
        user_id: new_token.user_id,
        token_value: new_token.token_value,
        is_active: true,
        issued_at: new_token.issued_at,
        expires_at: new_token.expires_at,
    }
}

impl UserRepository for InMemoryStore {
    async fn find_user_by_credentials(
        &mut self,
        email: &str,
        password: &str,
    ) -> PgResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .cloned())
    }
}

impl TokenRepository for InMemoryStore {
    async fn create_token(&mut self, new_token: NewToken) -> PgResult<Token> {
        self.run_concurrent_login();

        if !self.active_tokens(new_token.user_id).is_empty() {
            return Err(PgError::Query(DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new(UniqueViolation("tokens_user_active_unique_idx")),
            )));
        }

        let token = into_token(new_token);
        self.tokens.push(token.clone());
        Ok(token)
    }

    async fn find_token_by_id(&mut self, token_id: Uuid) -> PgResult<Option<Token>> {
        Ok(self.tokens.iter().find(|t| t.id == token_id).cloned())
    }

    async fn find_active_token(&mut self, user_id: Uuid) -> PgResult<Option<Token>> {
        Ok(self.active_tokens(user_id).first().map(|t| (*t).clone()))
    }

    async fn deactivate_token(&mut self, token_id: Uuid) -> PgResult<bool> {
        self.run_concurrent_login();

        let token = self
            .tokens
            .iter_mut()
            .find(|t| t.id == token_id && t.is_active);

        Ok(match token {
            Some(token) => {
                token.is_active = false;
                true
            }
            None => false,
        })
    }
}
