use async_trait::async_trait;

use crate::domain::book::{Author, AuthorSummary};
use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait AuthorRepository: Send + Sync {
    async fn create_author(&self, name: &str) -> Result<Author, DomainError>;
    async fn get_author(&self, id: i64) -> Result<Option<Author>, DomainError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<Author>, DomainError>;
    async fn list_authors(&self) -> Result<Vec<AuthorSummary>, DomainError>;
    /// Fails with `DomainError::Conflict` while books still reference the author.
    async fn delete_author(&self, id: i64) -> Result<bool, DomainError>;
}
