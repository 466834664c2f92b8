use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) bio: String,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ProfilePatch {
    pub(crate) email: Option<String>,
    pub(crate) first_name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) bio: Option<String>,
    /// `Some(None)` clears the stored picture.
    pub(crate) profile_picture: Option<Option<String>>,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    async fn find_by_username(&self, username: &str)
    -> Result<Option<UserCredentials>, DomainError>;
    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError>;
    async fn update_profile(&self, id: i64, patch: ProfilePatch)
    -> Result<Option<User>, DomainError>;
    /// Returns `false` when the relation already existed.
    async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, DomainError>;
    async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<bool, DomainError>;
}
