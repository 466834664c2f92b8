use async_trait::async_trait;

use crate::domain::book::Book;
use crate::domain::error::DomainError;
use crate::domain::query::BookQuery;

#[derive(Debug, Clone)]
pub(crate) struct NewBook {
    pub(crate) title: String,
    pub(crate) author_id: i64,
    pub(crate) publication_year: Option<i32>,
    pub(crate) description: String,
    pub(crate) price: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct BookPatch {
    pub(crate) title: String,
    pub(crate) author_id: i64,
    pub(crate) publication_year: Option<i32>,
    pub(crate) description: String,
    pub(crate) price: f64,
}

#[async_trait]
pub(crate) trait BookRepository: Send + Sync {
    async fn create_book(&self, input: NewBook) -> Result<Book, DomainError>;
    async fn get_book(&self, id: i64) -> Result<Option<Book>, DomainError>;
    async fn list_books(&self, query: &BookQuery) -> Result<Vec<Book>, DomainError>;
    async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Option<Book>, DomainError>;
    async fn delete_book(&self, id: i64) -> Result<bool, DomainError>;
    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError>;
}
