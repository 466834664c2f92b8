use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::book::{Author, AuthorSummary, CreateAuthorRequest};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::{AppJson, AppPath};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct CreateAuthorDto {
    #[serde(default)]
    pub(crate) name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) book_count: i64,
}

impl From<AuthorSummary> for AuthorDto {
    fn from(author: AuthorSummary) -> Self {
        Self {
            id: author.id,
            name: author.name,
            book_count: author.book_count,
        }
    }
}

impl From<Author> for AuthorDto {
    fn from(author: Author) -> Self {
        Self {
            id: author.id,
            name: author.name,
            book_count: 0,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/authors",
    tag = "authors",
    responses(
        (status = 200, description = "All authors with their book counts", body = [AuthorDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_authors(State(state): State<AppState>) -> AppResult<Json<Vec<AuthorDto>>> {
    let authors = state.catalog.list_authors().await?;
    Ok(Json(authors.into_iter().map(AuthorDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/authors/{id}",
    tag = "authors",
    params(
        ("id" = i64, Path, description = "Author id")
    ),
    responses(
        (status = 200, description = "Author found", body = AuthorDto),
        (status = 404, description = "Author not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_author(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<AuthorDto>> {
    let author = state.catalog.get_author(id).await?;
    Ok(Json(AuthorDto::from(author)))
}

#[utoipa::path(
    post,
    path = "/api/authors",
    tag = "authors",
    security(
        ("token_auth" = [])
    ),
    request_body = CreateAuthorDto,
    responses(
        (status = 201, description = "Author created", body = AuthorDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Author name already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_author(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(dto): AppJson<CreateAuthorDto>,
) -> AppResult<(StatusCode, Json<AuthorDto>)> {
    let req = CreateAuthorRequest { name: dto.name };

    let author = state.catalog.create_author(auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(AuthorDto::from(author))))
}

#[utoipa::path(
    delete,
    path = "/api/authors/{id}",
    tag = "authors",
    security(
        ("token_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Author id")
    ),
    responses(
        (status = 204, description = "Author deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Author not found"),
        (status = 409, description = "Author still has books"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_author(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    state.catalog.delete_author(auth.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
