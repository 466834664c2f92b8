use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DomainError, FieldErrors};
use super::validation;

pub(crate) const NAME_MAX_CHARS: usize = 150;
pub(crate) const BIO_MAX_CHARS: usize = 2000;
pub(crate) const PROFILE_PICTURE_MAX_CHARS: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password: String,
    pub(crate) password2: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) bio: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let mut errors = FieldErrors::new();

        let username = errors.check("username", validation::username(&self.username));
        let email = errors.check("email", validation::email(&self.email));
        let first_name = errors.check(
            "first_name",
            validation::optional_text(&self.first_name, NAME_MAX_CHARS),
        );
        let last_name = errors.check(
            "last_name",
            validation::optional_text(&self.last_name, NAME_MAX_CHARS),
        );
        let bio = errors.check("bio", validation::optional_text(&self.bio, BIO_MAX_CHARS));
        errors.check("password", validation::password(&self.password));
        errors.check("password2", validation::password(&self.password2));
        if !self.password.is_empty() && !self.password2.is_empty() {
            errors.check(
                "password",
                validation::password_confirmation(&self.password, &self.password2),
            );
        }

        match (username, email, first_name, last_name, bio) {
            (Some(username), Some(email), Some(first_name), Some(last_name), Some(bio))
                if errors.is_empty() =>
            {
                Ok(Self {
                    username,
                    email,
                    password: self.password,
                    password2: self.password2,
                    first_name,
                    last_name,
                    bio,
                })
            }
            _ => Err(DomainError::Validation(errors)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let mut errors = FieldErrors::new();
        let username = self.username.trim().to_string();
        if username.is_empty() {
            errors.add("username", validation::BLANK_MESSAGE);
        }
        errors.check("password", validation::password(&self.password));
        errors.into_result()?;

        Ok(Self {
            username,
            password: self.password,
        })
    }
}

/// Partial profile update; `None` leaves the field untouched.
///
/// An empty `profile_picture` clears the stored reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ProfileUpdateRequest {
    pub(crate) email: Option<String>,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) bio: Option<String>,
    pub(crate) profile_picture: Option<String>,
}

impl ProfileUpdateRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let mut errors = FieldErrors::new();

        let email = self
            .email
            .map(|email| errors.check("email", validation::email(&email)));
        let first_name = self.first_name.map(|name| {
            errors.check("first_name", validation::optional_text(&name, NAME_MAX_CHARS))
        });
        let last_name = self.last_name.map(|name| {
            errors.check("last_name", validation::optional_text(&name, NAME_MAX_CHARS))
        });
        let bio = self
            .bio
            .map(|bio| errors.check("bio", validation::optional_text(&bio, BIO_MAX_CHARS)));
        let profile_picture = self.profile_picture.map(|picture| {
            errors.check(
                "profile_picture",
                validation::optional_text(&picture, PROFILE_PICTURE_MAX_CHARS),
            )
        });
        errors.into_result()?;

        Ok(Self {
            email: email.flatten(),
            first_name: first_name.flatten(),
            last_name: last_name.flatten(),
            bio: bio.flatten(),
            profile_picture: profile_picture.flatten(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) bio: String,
    pub(crate) profile_picture: Option<String>,
    /// Ids of users following this user.
    pub(crate) followers: Vec<i64>,
    /// Ids of users this user follows.
    pub(crate) following: Vec<i64>,
    pub(crate) date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AuthToken {
    pub(crate) key: String,
    pub(crate) user_id: i64,
    pub(crate) created_at: DateTime<Utc>,
}
