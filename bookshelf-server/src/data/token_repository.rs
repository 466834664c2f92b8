use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::AuthToken;

#[async_trait]
pub(crate) trait TokenRepository: Send + Sync {
    /// Returns the user's existing token, or stores `candidate_key` as a new one.
    async fn get_or_create(&self, user_id: i64, candidate_key: &str)
    -> Result<AuthToken, DomainError>;
    async fn find_user_id(&self, key: &str) -> Result<Option<i64>, DomainError>;
    async fn revoke(&self, user_id: i64) -> Result<bool, DomainError>;
}
