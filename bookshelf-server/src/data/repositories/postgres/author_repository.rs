use async_trait::async_trait;
use sqlx::PgPool;

use crate::data::author_repository::AuthorRepository;
use crate::domain::book::{Author, AuthorSummary};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct PostgresAuthorRepository {
    pool: PgPool,
}

impl PostgresAuthorRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    id: i64,
    name: String,
}

#[derive(sqlx::FromRow)]
struct AuthorSummaryRow {
    id: i64,
    name: String,
    book_count: i64,
}

impl From<AuthorRow> for Author {
    fn from(row: AuthorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[async_trait]
impl AuthorRepository for PostgresAuthorRepository {
    async fn create_author(&self, name: &str) -> Result<Author, DomainError> {
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            INSERT INTO authors (name)
            VALUES ($1)
            RETURNING id, name
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_author_db_error)?;

        Ok(row.into())
    }

    async fn get_author(&self, id: i64) -> Result<Option<Author>, DomainError> {
        let row = sqlx::query_as::<_, AuthorRow>("SELECT id, name FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_author_db_error)?;

        Ok(row.map(Author::from))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Author>, DomainError> {
        let row = sqlx::query_as::<_, AuthorRow>("SELECT id, name FROM authors WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_author_db_error)?;

        Ok(row.map(Author::from))
    }

    async fn list_authors(&self) -> Result<Vec<AuthorSummary>, DomainError> {
        let rows = sqlx::query_as::<_, AuthorSummaryRow>(
            r#"
            SELECT
                a.id,
                a.name,
                COUNT(b.id) AS book_count
            FROM authors a
            LEFT JOIN books b ON b.author_id = a.id
            GROUP BY a.id, a.name
            ORDER BY a.name COLLATE "C", a.id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_author_db_error)?;

        Ok(rows
            .into_iter()
            .map(|row| AuthorSummary {
                id: row.id,
                name: row.name,
                book_count: row.book_count,
            })
            .collect())
    }

    async fn delete_author(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_author_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_author_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.code().as_deref() {
            Some("23505") => return DomainError::AlreadyExists("author name".to_string()),
            Some("23503") => {
                return DomainError::Conflict("author is referenced by books".to_string());
            }
            _ => {}
        }
    }
    DomainError::Unexpected(err.to_string())
}
