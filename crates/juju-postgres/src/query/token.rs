//! Token repository for issuing and superseding bearer tokens.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewToken, Token};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Storage for issued tokens.
///
/// The `tokens_user_active_unique_idx` partial unique index guarantees at
/// most one active token per user, so [`create_token`] fails with a unique
/// violation while another active token exists.
///
/// [`create_token`]: TokenRepository::create_token
pub trait TokenRepository {
    /// Records a newly minted token as active.
    fn create_token(
        &mut self,
        new_token: NewToken,
    ) -> impl Future<Output = PgResult<Token>> + Send;

    /// Finds a token by ID regardless of its status.
    fn find_token_by_id(
        &mut self,
        token_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Token>>> + Send;

    /// Finds the user's active token, expired or not.
    fn find_active_token(
        &mut self,
        user_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Token>>> + Send;

    /// Marks a token inactive if it is still active.
    ///
    /// Returns `true` only for the caller that flipped the flag, so two
    /// concurrent callers can never both win.
    fn deactivate_token(&mut self, token_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;
}

impl TokenRepository for PgConnection {
    async fn create_token(&mut self, new_token: NewToken) -> PgResult<Token> {
        use schema::tokens;

        let token = diesel::insert_into(tokens::table)
            .values(&new_token)
            .returning(Token::as_returning())
            .get_result(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            token_id = %token.id,
            user_id = %token.user_id,
            "Recorded new token"
        );

        Ok(token)
    }

    async fn find_token_by_id(&mut self, token_id: Uuid) -> PgResult<Option<Token>> {
        use schema::tokens::{self, dsl};

        tokens::table
            .filter(dsl::id.eq(token_id))
            .select(Token::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn find_active_token(&mut self, user_id: Uuid) -> PgResult<Option<Token>> {
        use schema::tokens::{self, dsl};

        tokens::table
            .filter(dsl::user_id.eq(user_id))
            .filter(dsl::is_active.eq(true))
            .select(Token::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)
    }

    async fn deactivate_token(&mut self, token_id: Uuid) -> PgResult<bool> {
        use schema::tokens::{self, dsl};

        let rows_affected = diesel::update(
            tokens::table
                .filter(dsl::id.eq(token_id))
                .filter(dsl::is_active.eq(true)),
        )
        .set(dsl::is_active.eq(false))
        .execute(self)
        .await
        .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            token_id = %token_id,
            deactivated = rows_affected > 0,
            "Deactivated token"
        );

        Ok(rows_affected > 0)
    }
}
