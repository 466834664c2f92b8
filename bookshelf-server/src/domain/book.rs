use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{DomainError, FieldErrors};
use super::validation;

pub(crate) const TITLE_MAX_CHARS: usize = 255;
pub(crate) const AUTHOR_NAME_MAX_CHARS: usize = 255;
pub(crate) const DESCRIPTION_MAX_CHARS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Author {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct AuthorSummary {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) book_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct Book {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author_id: i64,
    /// Name of the referenced author.
    pub(crate) author: String,
    pub(crate) publication_year: Option<i32>,
    pub(crate) description: String,
    pub(crate) price: f64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateBookRequest {
    pub(crate) title: String,
    /// Author name, resolved to an author record by the catalog.
    pub(crate) author: String,
    pub(crate) publication_year: Option<i32>,
    pub(crate) description: String,
    /// `None` when the payload omitted it; rejected as required.
    pub(crate) price: Option<f64>,
}

impl CreateBookRequest {
    pub(crate) fn validate(self, current_year: i32) -> Result<BookFields, DomainError> {
        validate_book_fields(
            &self.title,
            &self.author,
            self.publication_year,
            &self.description,
            self.price,
            current_year,
        )
    }
}

/// Full replacement of a book's writable fields (PUT semantics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdateBookRequest {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) publication_year: Option<i32>,
    pub(crate) description: String,
    pub(crate) price: Option<f64>,
}

impl UpdateBookRequest {
    pub(crate) fn validate(self, current_year: i32) -> Result<BookFields, DomainError> {
        validate_book_fields(
            &self.title,
            &self.author,
            self.publication_year,
            &self.description,
            self.price,
            current_year,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateAuthorRequest {
    pub(crate) name: String,
}

impl CreateAuthorRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let name = normalize_author_name(&self.name)?;
        Ok(Self { name })
    }
}

pub(crate) fn normalize_author_name(name: &str) -> Result<String, DomainError> {
    validation::required_text(name, AUTHOR_NAME_MAX_CHARS)
        .map_err(|message| DomainError::validation("name", message))
}

/// Normalized writable fields of a book that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BookFields {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) publication_year: Option<i32>,
    pub(crate) description: String,
    pub(crate) price: f64,
}

fn validate_book_fields(
    title: &str,
    author: &str,
    publication_year: Option<i32>,
    description: &str,
    price: Option<f64>,
    current_year: i32,
) -> Result<BookFields, DomainError> {
    let mut errors = FieldErrors::new();

    let title = errors.check("title", validation::required_text(title, TITLE_MAX_CHARS));
    let author = errors.check(
        "author",
        validation::required_text(author, AUTHOR_NAME_MAX_CHARS),
    );
    let publication_year = match publication_year {
        Some(year) => errors
            .check(
                "publication_year",
                validation::publication_year(year, current_year),
            )
            .map(Some),
        None => Some(None),
    };
    let description = errors.check(
        "description",
        validation::optional_text(description, DESCRIPTION_MAX_CHARS),
    );
    let price = match price {
        Some(price) => errors.check("price", validation::price(price)),
        None => {
            errors.add("price", validation::REQUIRED_MESSAGE);
            None
        }
    };

    match (title, author, publication_year, description, price) {
        (Some(title), Some(author), Some(publication_year), Some(description), Some(price)) => {
            Ok(BookFields {
                title,
                author,
                publication_year,
                description,
                price,
            })
        }
        _ => Err(DomainError::Validation(errors)),
    }
}
