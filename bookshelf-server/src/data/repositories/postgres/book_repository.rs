use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::book_repository::{BookPatch, BookRepository, NewBook};
use crate::domain::book::Book;
use crate::domain::error::DomainError;
use crate::domain::query::{BookOrdering, BookQuery, Direction, SortField};

const SELECT_BOOKS: &str = r#"
    SELECT
        b.id,
        b.title,
        b.author_id,
        a.name AS author,
        b.publication_year,
        b.description,
        b.price,
        b.created_at,
        b.updated_at
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

#[derive(Debug, Clone)]
pub(crate) struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author_id: i64,
    author: String,
    publication_year: Option<i32>,
    description: String,
    price: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BookRow> for Book {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            author_id: row.author_id,
            author: row.author,
            publication_year: row.publication_year,
            description: row.description,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    async fn create_book(&self, input: NewBook) -> Result<Book, DomainError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            WITH inserted AS (
                INSERT INTO books (title, author_id, publication_year, description, price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
            )
            SELECT
                i.id,
                i.title,
                i.author_id,
                a.name AS author,
                i.publication_year,
                i.description,
                i.price,
                i.created_at,
                i.updated_at
            FROM inserted i
            JOIN authors a ON a.id = i.author_id
            "#,
        )
        .bind(input.title)
        .bind(input.author_id)
        .bind(input.publication_year)
        .bind(input.description)
        .bind(input.price)
        .fetch_one(&self.pool)
        .await
        .map_err(map_book_db_error)?;

        Ok(row.into())
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, DomainError> {
        let row = sqlx::query_as::<_, BookRow>(&format!("{SELECT_BOOKS} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_book_db_error)?;

        Ok(row.map(Book::from))
    }

    async fn list_books(&self, query: &BookQuery) -> Result<Vec<Book>, DomainError> {
        let mut builder = build_list_query(query);
        let rows = builder
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_book_db_error)?;

        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Option<Book>, DomainError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            WITH updated AS (
                UPDATE books
                SET title = $2,
                    author_id = $3,
                    publication_year = $4,
                    description = $5,
                    price = $6,
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT
                u.id,
                u.title,
                u.author_id,
                a.name AS author,
                u.publication_year,
                u.description,
                u.price,
                u.created_at,
                u.updated_at
            FROM updated u
            JOIN authors a ON a.id = u.author_id
            "#,
        )
        .bind(id)
        .bind(patch.title)
        .bind(patch.author_id)
        .bind(patch.publication_year)
        .bind(patch.description)
        .bind(patch.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_book_db_error)?;

        Ok(row.map(Book::from))
    }

    async fn delete_book(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_book_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM books WHERE author_id = $1")
            .bind(author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_book_db_error)
    }
}

fn build_list_query(query: &BookQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(SELECT_BOOKS);
    builder.push(" WHERE TRUE");

    let filter = &query.filter;
    if let Some(title) = &filter.title {
        builder.push(" AND b.title = ").push_bind(title.clone());
    }
    if let Some(author) = &filter.author {
        builder.push(" AND a.name = ").push_bind(author.clone());
    }
    if let Some(year) = filter.publication_year {
        builder.push(" AND b.publication_year = ").push_bind(year);
    }
    if let Some(price) = filter.price {
        builder.push(" AND b.price = ").push_bind(price);
    }
    for term in &query.search_terms {
        let pattern = format!("%{}%", escape_like(term));
        builder
            .push(" AND (b.title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR a.name ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    builder
        .push(" ORDER BY ")
        .push(order_clause(query.ordering))
        .push(", b.id ASC");
    builder
}

// Текстовые поля сортируются по байтам, как и в in-memory хранилище.
fn order_clause(ordering: BookOrdering) -> String {
    let column = match ordering.field {
        SortField::Id => "b.id",
        SortField::Title => r#"b.title COLLATE "C""#,
        SortField::Author => r#"a.name COLLATE "C""#,
        SortField::PublicationYear => "b.publication_year",
        SortField::Price => "b.price",
    };
    let direction = match ordering.direction {
        Direction::Asc => "ASC",
        Direction::Desc => "DESC",
    };
    format!("{column} {direction} NULLS LAST")
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn map_book_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("author".to_string());
    }
    DomainError::Unexpected(err.to_string())
}
