use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::book::{Book, CreateBookRequest, UpdateBookRequest};
use crate::domain::query::ListBooksParams;
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::{AppJson, AppPath, AppQuery};
use crate::presentation::middleware::auth::AuthenticatedUser;

/// Body of `POST /api/books` and `PUT /api/books/{id}`.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct BookPayloadDto {
    #[serde(default)]
    pub(crate) title: String,
    /// Author name; an unknown name creates the author.
    #[serde(default)]
    pub(crate) author: String,
    pub(crate) publication_year: Option<i32>,
    #[serde(default)]
    pub(crate) description: String,
    /// Required; reported together with the other field errors when absent.
    pub(crate) price: Option<f64>,
}

impl From<BookPayloadDto> for CreateBookRequest {
    fn from(dto: BookPayloadDto) -> Self {
        Self {
            title: dto.title,
            author: dto.author,
            publication_year: dto.publication_year,
            description: dto.description,
            price: dto.price,
        }
    }
}

impl From<BookPayloadDto> for UpdateBookRequest {
    fn from(dto: BookPayloadDto) -> Self {
        Self {
            title: dto.title,
            author: dto.author,
            publication_year: dto.publication_year,
            description: dto.description,
            price: dto.price,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListBooksQuery {
    /// Terms matched against title or author name.
    pub(crate) search: Option<String>,
    /// `id`, `title`, `author`, `publication_year` or `price`; `-` prefix sorts descending.
    pub(crate) ordering: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) publication_year: Option<String>,
    pub(crate) price: Option<String>,
}

impl From<ListBooksQuery> for ListBooksParams {
    fn from(query: ListBooksQuery) -> Self {
        Self {
            search: query.search,
            ordering: query.ordering,
            title: query.title,
            author: query.author,
            publication_year: query.publication_year,
            price: query.price,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BookDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) author_id: i64,
    pub(crate) publication_year: Option<i32>,
    pub(crate) description: String,
    pub(crate) price: f64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Book> for BookDto {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            author_id: book.author_id,
            publication_year: book.publication_year,
            description: book.description,
            price: book.price,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/books",
    tag = "books",
    params(ListBooksQuery),
    responses(
        (status = 200, description = "Books matching the query", body = [BookDto]),
        (status = 400, description = "Unknown ordering or malformed filter"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_books(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ListBooksQuery>,
) -> AppResult<Json<Vec<BookDto>>> {
    let books = state.catalog.list_books(query.into()).await?;
    Ok(Json(books.into_iter().map(BookDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    tag = "books",
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 200, description = "Book found", body = BookDto),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_book(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<BookDto>> {
    let book = state.catalog.get_book(id).await?;
    Ok(Json(BookDto::from(book)))
}

#[utoipa::path(
    post,
    path = "/api/books",
    tag = "books",
    security(
        ("token_auth" = [])
    ),
    request_body = BookPayloadDto,
    responses(
        (status = 201, description = "Book created", body = BookDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_book(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(dto): AppJson<BookPayloadDto>,
) -> AppResult<(StatusCode, Json<BookDto>)> {
    let book = state.catalog.create_book(auth.user_id, dto.into()).await?;
    Ok((StatusCode::CREATED, Json(BookDto::from(book))))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    tag = "books",
    security(
        ("token_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    request_body = BookPayloadDto,
    responses(
        (status = 200, description = "Book updated", body = BookDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_book(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
    AppJson(dto): AppJson<BookPayloadDto>,
) -> AppResult<Json<BookDto>> {
    let book = state.catalog.update_book(auth.user_id, id, dto.into()).await?;
    Ok(Json(BookDto::from(book)))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    tag = "books",
    security(
        ("token_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Book id")
    ),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Book not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_book(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state.catalog.delete_book(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
