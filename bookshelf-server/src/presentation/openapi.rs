use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::handlers::accounts::{
    AuthResponseDto, LoginDto, ProfileUpdateDto, RegisterDto, UserDto,
};
use crate::presentation::handlers::authors::{AuthorDto, CreateAuthorDto};
use crate::presentation::handlers::books::{BookDto, BookPayloadDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::handlers::books::list_books,
        crate::presentation::handlers::books::get_book,
        crate::presentation::handlers::books::create_book,
        crate::presentation::handlers::books::update_book,
        crate::presentation::handlers::books::delete_book,
        crate::presentation::handlers::authors::list_authors,
        crate::presentation::handlers::authors::get_author,
        crate::presentation::handlers::authors::create_author,
        crate::presentation::handlers::authors::delete_author,
        crate::presentation::handlers::accounts::register,
        crate::presentation::handlers::accounts::login,
        crate::presentation::handlers::accounts::logout,
        crate::presentation::handlers::accounts::get_profile,
        crate::presentation::handlers::accounts::update_profile,
        crate::presentation::handlers::accounts::follow,
        crate::presentation::handlers::accounts::unfollow
    ),
    components(
        schemas(
            BookPayloadDto,
            BookDto,
            CreateAuthorDto,
            AuthorDto,
            RegisterDto,
            LoginDto,
            ProfileUpdateDto,
            UserDto,
            AuthResponseDto
        )
    ),
    tags(
        (name = "books", description = "Book catalog"),
        (name = "authors", description = "Book authors"),
        (name = "accounts", description = "Registration, login and profiles")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "token_auth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Token <key>",
            ))),
        );
        openapi.components = Some(components);
    }
}
