use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::data::user_repository::{NewUser, ProfilePatch, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::User;

const SELECT_USERS: &str = r#"
    SELECT
        u.id,
        u.username,
        u.email,
        u.first_name,
        u.last_name,
        u.bio,
        u.profile_picture,
        u.password_hash,
        u.date_joined,
        ARRAY(
            SELECT f.follower_id FROM follows f
            WHERE f.followee_id = u.id
            ORDER BY f.follower_id
        ) AS followers,
        ARRAY(
            SELECT f.followee_id FROM follows f
            WHERE f.follower_id = u.id
            ORDER BY f.followee_id
        ) AS following
    FROM users u
"#;

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_id(&self, id: i64) -> Result<Option<UserCredentialsRow>, DomainError> {
        sqlx::query_as::<_, UserCredentialsRow>(&format!("{SELECT_USERS} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)
    }
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    id: i64,
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    bio: String,
    profile_picture: Option<String>,
    password_hash: String,
    date_joined: DateTime<Utc>,
    followers: Vec<i64>,
    following: Vec<i64>,
}

impl From<UserCredentialsRow> for UserCredentials {
    fn from(row: UserCredentialsRow) -> Self {
        Self {
            user: User {
                id: row.id,
                username: row.username,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                bio: row.bio,
                profile_picture: row.profile_picture,
                followers: row.followers,
                following: row.following,
                date_joined: row.date_joined,
            },
            password_hash: row.password_hash,
        }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, email, first_name, last_name, bio, password_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.username)
        .bind(input.email)
        .bind(input.first_name)
        .bind(input.last_name)
        .bind(input.bio)
        .bind(input.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        self.fetch_by_id(id)
            .await?
            .map(|row| UserCredentials::from(row).user)
            .ok_or_else(|| DomainError::Unexpected(format!("user {id} vanished after insert")))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(&format!(
            "{SELECT_USERS} WHERE u.username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(row.map(UserCredentials::from))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        Ok(self
            .fetch_by_id(id)
            .await?
            .map(|row| UserCredentials::from(row).user))
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let clear_or_set_picture = patch.profile_picture.is_some();
        let updated = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                bio = COALESCE($5, bio),
                profile_picture = CASE WHEN $6 THEN $7 ELSE profile_picture END
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(patch.email)
        .bind(patch.first_name)
        .bind(patch.last_name)
        .bind(patch.bio)
        .bind(clear_or_set_picture)
        .bind(patch.profile_picture.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        match updated {
            Some(id) => self.get_user(id).await,
            None => Ok(None),
        }
    }

    async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followee_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<bool, DomainError> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
                .bind(follower_id)
                .bind(followee_id)
                .execute(&self.pool)
                .await
                .map_err(map_user_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                let resource = match db_err.constraint() {
                    Some("users_username_key") => "username",
                    _ => "user",
                };
                return DomainError::AlreadyExists(resource.to_string());
            }
            Some("23503") => return DomainError::NotFound("user".to_string()),
            Some("23514") => {
                return DomainError::validation("user", "You cannot follow yourself.");
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
