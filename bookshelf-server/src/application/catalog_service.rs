use std::sync::Arc;

use tracing::info;

use crate::data::author_repository::AuthorRepository;
use crate::data::book_repository::{BookPatch, BookRepository, NewBook};
use crate::domain::book::{
    Author, AuthorSummary, Book, CreateAuthorRequest, CreateBookRequest, UpdateBookRequest,
};
use crate::domain::error::DomainError;
use crate::domain::query::{BookQuery, ListBooksParams};
use crate::domain::validation::current_year;

pub(crate) struct CatalogService {
    books: Arc<dyn BookRepository>,
    authors: Arc<dyn AuthorRepository>,
}

impl CatalogService {
    pub(crate) fn new(books: Arc<dyn BookRepository>, authors: Arc<dyn AuthorRepository>) -> Self {
        Self { books, authors }
    }

    pub(crate) async fn create_book(
        &self,
        actor_user_id: i64,
        req: CreateBookRequest,
    ) -> Result<Book, DomainError> {
        let req = req.validate(current_year())?;
        let author = self.resolve_author(&req.author).await?;

        let new_book = NewBook {
            title: req.title,
            author_id: author.id,
            publication_year: req.publication_year,
            description: req.description,
            price: req.price,
        };
        let book = self.books.create_book(new_book).await?;

        info!(book_id = book.id, author_id = author.id, actor_user_id, "book created");
        Ok(book)
    }

    pub(crate) async fn get_book(&self, id: i64) -> Result<Book, DomainError> {
        self.books
            .get_book(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("book id: {id}")))
    }

    pub(crate) async fn list_books(&self, params: ListBooksParams) -> Result<Vec<Book>, DomainError> {
        let query = BookQuery::from_params(params)?;
        self.books.list_books(&query).await
    }

    pub(crate) async fn update_book(
        &self,
        actor_user_id: i64,
        book_id: i64,
        req: UpdateBookRequest,
    ) -> Result<Book, DomainError> {
        let req = req.validate(current_year())?;
        self.get_book(book_id).await?;
        let author = self.resolve_author(&req.author).await?;

        let patch = BookPatch {
            title: req.title,
            author_id: author.id,
            publication_year: req.publication_year,
            description: req.description,
            price: req.price,
        };
        let book = self
            .books
            .update_book(book_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("book id: {book_id}")))?;

        info!(book_id, actor_user_id, "book updated");
        Ok(book)
    }

    pub(crate) async fn delete_book(
        &self,
        actor_user_id: i64,
        book_id: i64,
    ) -> Result<(), DomainError> {
        let deleted = self.books.delete_book(book_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("book id: {book_id}")));
        }

        info!(book_id, actor_user_id, "book deleted");
        Ok(())
    }

    pub(crate) async fn list_authors(&self) -> Result<Vec<AuthorSummary>, DomainError> {
        self.authors.list_authors().await
    }

    pub(crate) async fn get_author(&self, id: i64) -> Result<AuthorSummary, DomainError> {
        let author = self
            .authors
            .get_author(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("author id: {id}")))?;
        let book_count = self.books.count_by_author(author.id).await?;

        Ok(AuthorSummary {
            id: author.id,
            name: author.name,
            book_count,
        })
    }

    pub(crate) async fn create_author(
        &self,
        actor_user_id: i64,
        req: CreateAuthorRequest,
    ) -> Result<Author, DomainError> {
        let req = req.validate()?;
        if self.authors.find_by_name(&req.name).await?.is_some() {
            return Err(DomainError::AlreadyExists("author name".to_string()));
        }

        let author = self.authors.create_author(&req.name).await?;
        info!(author_id = author.id, actor_user_id, "author created");
        Ok(author)
    }

    /// Authors that still have books are never deleted.
    pub(crate) async fn delete_author(
        &self,
        actor_user_id: i64,
        author_id: i64,
    ) -> Result<(), DomainError> {
        self.get_author(author_id).await?;

        let referenced = self.books.count_by_author(author_id).await?;
        if referenced > 0 {
            return Err(DomainError::Conflict(format!(
                "author id {author_id} is referenced by {referenced} book(s)"
            )));
        }

        let deleted = self.authors.delete_author(author_id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("author id: {author_id}")));
        }

        info!(author_id, actor_user_id, "author deleted");
        Ok(())
    }

    /// `name` must already be normalized by request validation.
    async fn resolve_author(&self, name: &str) -> Result<Author, DomainError> {
        if let Some(author) = self.authors.find_by_name(name).await? {
            return Ok(author);
        }

        match self.authors.create_author(name).await {
            Ok(author) => {
                info!(author_id = author.id, "author created on first book");
                Ok(author)
            }
            // другой запрос успел создать автора с тем же именем
            Err(DomainError::AlreadyExists(_)) => self
                .authors
                .find_by_name(name)
                .await?
                .ok_or_else(|| DomainError::Unexpected(format!("author '{name}' vanished"))),
            Err(err) => Err(err),
        }
    }
}
