use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::token_repository::TokenRepository;
use crate::domain::error::DomainError;
use crate::domain::user::AuthToken;

#[derive(Debug, Clone)]
pub(crate) struct PostgresTokenRepository {
    pool: PgPool,
}

impl PostgresTokenRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    key: String,
    user_id: i64,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl TokenRepository for PostgresTokenRepository {
    async fn get_or_create(
        &self,
        user_id: i64,
        candidate_key: &str,
    ) -> Result<AuthToken, DomainError> {
        // При конфликте DO UPDATE блокирует и возвращает уже закоммиченную строку,
        // ключ остаётся прежним.
        let row = sqlx::query_as::<_, TokenRow>(
            r#"
            INSERT INTO auth_tokens (key, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING key, user_id, created_at
            "#,
        )
        .bind(candidate_key)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_token_db_error)?;

        Ok(AuthToken {
            key: row.key,
            user_id: row.user_id,
            created_at: row.created_at,
        })
    }

    async fn find_user_id(&self, key: &str) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM auth_tokens WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_token_db_error)
    }

    async fn revoke(&self, user_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM auth_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(map_token_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_token_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("user".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
