use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::{info, warn};

use crate::data::token_repository::TokenRepository;
use crate::data::user_repository::{NewUser, ProfilePatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, ProfileUpdateRequest, RegisterRequest, User};
use crate::infrastructure::tokens::generate_key;

pub(crate) const SELF_FOLLOW_MESSAGE: &str = "You cannot follow yourself.";

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) token: String,
}

pub(crate) struct AccountService {
    users: Arc<dyn UserRepository>,
    tokens: Arc<dyn TokenRepository>,
}

impl AccountService {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(users: Arc<dyn UserRepository>, tokens: Arc<dyn TokenRepository>) -> Self {
        Self { users, tokens }
    }

    /// Creates the account and its API token. Nothing is stored when validation fails.
    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let password_hash = self.hash_password(&req.password)?;

        let new_user = Self::into_new_user(req, password_hash);
        let user = self.users.create_user(new_user).await?;
        let token = self.tokens.get_or_create(user.id, &generate_key()).await?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(AuthResult {
            user,
            token: token.key,
        })
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.users.find_by_username(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                // стремимся к одинаковому времени проверки если user не найден
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                warn!(username = %req.username, "login for unknown user");
                return Err(DomainError::InvalidCredentials);
            }
        };

        if let Err(err) = self.verify_password(&req.password, &user_creds.password_hash) {
            warn!(user_id = user_creds.user.id, "login with wrong password");
            return Err(err);
        }

        // повторный вход отдаёт тот же токен
        let token = self
            .tokens
            .get_or_create(user_creds.user.id, &generate_key())
            .await?;

        info!(user_id = user_creds.user.id, "user logged in");
        Ok(AuthResult {
            user: user_creds.user,
            token: token.key,
        })
    }

    pub(crate) async fn logout(&self, user_id: i64) -> Result<(), DomainError> {
        let revoked = self.tokens.revoke(user_id).await?;
        info!(user_id, revoked, "user logged out");
        Ok(())
    }

    /// Resolves an API token key to its owner.
    pub(crate) async fn authenticate(&self, key: &str) -> Result<User, DomainError> {
        let user_id = self
            .tokens
            .find_user_id(key)
            .await?
            .ok_or(DomainError::Unauthenticated)?;

        self.users
            .get_user(user_id)
            .await?
            .ok_or(DomainError::Unauthenticated)
    }

    pub(crate) async fn profile(&self, user_id: i64) -> Result<User, DomainError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }

    pub(crate) async fn update_profile(
        &self,
        user_id: i64,
        req: ProfileUpdateRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;

        let patch = ProfilePatch {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            profile_picture: req
                .profile_picture
                .map(|picture| (!picture.is_empty()).then_some(picture)),
        };

        let user = self
            .users
            .update_profile(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))?;

        info!(user_id, "profile updated");
        Ok(user)
    }

    /// Returns the follower's refreshed profile.
    pub(crate) async fn follow(&self, user_id: i64, target_id: i64) -> Result<User, DomainError> {
        if user_id == target_id {
            return Err(DomainError::validation("user", SELF_FOLLOW_MESSAGE));
        }

        let created = self.users.follow(user_id, target_id).await?;
        info!(user_id, target_id, created, "user followed");
        self.profile(user_id).await
    }

    pub(crate) async fn unfollow(&self, user_id: i64, target_id: i64) -> Result<User, DomainError> {
        self.users
            .get_user(target_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {target_id}")))?;

        let removed = self.users.unfollow(user_id, target_id).await?;
        info!(user_id, target_id, removed, "user unfollowed");
        self.profile(user_id).await
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })?;

        Ok(())
    }

    fn into_new_user(req: RegisterRequest, password_hash: String) -> NewUser {
        NewUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            password_hash,
        }
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
