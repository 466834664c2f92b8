use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::account_service::AuthResult;
use crate::domain::user::{LoginRequest, ProfileUpdateRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::app_error::AppResult;
use crate::presentation::extract::{AppJson, AppPath};
use crate::presentation::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct RegisterDto {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) password2: String,
    #[serde(default)]
    pub(crate) first_name: String,
    #[serde(default)]
    pub(crate) last_name: String,
    #[serde(default)]
    pub(crate) bio: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct LoginDto {
    #[serde(default)]
    pub(crate) username: String,
    #[serde(default)]
    pub(crate) password: String,
}

/// Partial update; absent keys keep their stored value, an empty
/// `profile_picture` clears it.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct ProfileUpdateDto {
    pub(crate) email: Option<String>,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) profile_picture: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) bio: String,
    pub(crate) profile_picture: Option<String>,
    pub(crate) followers: Vec<i64>,
    pub(crate) following: Vec<i64>,
    pub(crate) date_joined: DateTime<Utc>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            profile_picture: user.profile_picture,
            followers: user.followers,
            following: user.following,
            date_joined: user.date_joined,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) user: UserDto,
    pub(crate) token: String,
}

impl From<AuthResult> for AuthResponseDto {
    fn from(result: AuthResult) -> Self {
        Self {
            user: result.user.into(),
            token: result.token,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/accounts/register",
    tag = "accounts",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Username already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    AppJson(dto): AppJson<RegisterDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    let req = RegisterRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
        password2: dto.password2,
        first_name: dto.first_name,
        last_name: dto.last_name,
        bio: dto.bio,
    };

    let result = state.accounts.register(req).await?;

    Ok((StatusCode::CREATED, Json(AuthResponseDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/api/accounts/login",
    tag = "accounts",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    AppJson(dto): AppJson<LoginDto>,
) -> AppResult<Json<AuthResponseDto>> {
    let req = LoginRequest {
        username: dto.username,
        password: dto.password,
    };

    let result = state.accounts.login(req).await?;

    Ok(Json(AuthResponseDto::from(result)))
}

#[utoipa::path(
    post,
    path = "/api/accounts/logout",
    tag = "accounts",
    security(
        ("token_auth" = [])
    ),
    responses(
        (status = 204, description = "Token revoked"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<StatusCode> {
    state.accounts.logout(auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/accounts/profile",
    tag = "accounts",
    security(
        ("token_auth" = [])
    ),
    responses(
        (status = 200, description = "Current user", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<Json<UserDto>> {
    let user = state.accounts.profile(auth.user_id).await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    put,
    path = "/api/accounts/profile",
    tag = "accounts",
    security(
        ("token_auth" = [])
    ),
    request_body = ProfileUpdateDto,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppJson(dto): AppJson<ProfileUpdateDto>,
) -> AppResult<Json<UserDto>> {
    let req = ProfileUpdateRequest {
        email: dto.email,
        first_name: dto.first_name,
        last_name: dto.last_name,
        bio: dto.bio,
        profile_picture: dto.profile_picture,
    };

    let user = state.accounts.update_profile(auth.user_id, req).await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    post,
    path = "/api/accounts/follow/{id}",
    tag = "accounts",
    security(
        ("token_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "User to follow")
    ),
    responses(
        (status = 200, description = "Follow recorded; returns the caller", body = UserDto),
        (status = 400, description = "Cannot follow yourself"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn follow(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<UserDto>> {
    let user = state.accounts.follow(auth.user_id, id).await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    delete,
    path = "/api/accounts/follow/{id}",
    tag = "accounts",
    security(
        ("token_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "User to unfollow")
    ),
    responses(
        (status = 200, description = "Follow removed; returns the caller", body = UserDto),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn unfollow(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<UserDto>> {
    let user = state.accounts.unfollow(auth.user_id, id).await?;
    Ok(Json(UserDto::from(user)))
}
