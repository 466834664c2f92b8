//! List query composition for books: exact filters, search and ordering.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::book::Book;
use super::error::{DomainError, FieldErrors};
use super::validation::INVALID_NUMBER_MESSAGE;

/// Raw list parameters as they arrive in the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct ListBooksParams {
    pub(crate) search: Option<String>,
    pub(crate) ordering: Option<String>,
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) publication_year: Option<String>,
    pub(crate) price: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SortField {
    Id,
    Title,
    Author,
    PublicationYear,
    Price,
}

impl SortField {
    pub(crate) const ALLOWED: [&'static str; 5] =
        ["id", "title", "author", "publication_year", "price"];

    fn parse(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "author" => Some(Self::Author),
            "publication_year" => Some(Self::PublicationYear),
            "price" => Some(Self::Price),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BookOrdering {
    pub(crate) field: SortField,
    pub(crate) direction: Direction,
}

impl Default for BookOrdering {
    fn default() -> Self {
        Self {
            field: SortField::Title,
            direction: Direction::Asc,
        }
    }
}

impl BookOrdering {
    /// `price` sorts ascending, `-price` descending.
    pub(crate) fn parse(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        let (direction, name) = match raw.strip_prefix('-') {
            Some(name) => (Direction::Desc, name),
            None => (Direction::Asc, raw),
        };
        let field = SortField::parse(name).ok_or_else(|| {
            format!(
                "Invalid ordering field '{name}'. Expected one of: {}.",
                SortField::ALLOWED.join(", ")
            )
        })?;
        Ok(Self { field, direction })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BookFilter {
    pub(crate) title: Option<String>,
    pub(crate) author: Option<String>,
    pub(crate) publication_year: Option<i32>,
    pub(crate) price: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct BookQuery {
    pub(crate) filter: BookFilter,
    /// Lowercased search terms; each must match the title or the author name.
    pub(crate) search_terms: Vec<String>,
    pub(crate) ordering: BookOrdering,
}

impl BookQuery {
    pub(crate) fn from_params(params: ListBooksParams) -> Result<Self, DomainError> {
        let mut errors = FieldErrors::new();

        let publication_year = non_empty(params.publication_year).and_then(|raw| {
            errors.check(
                "publication_year",
                raw.parse::<i32>()
                    .map_err(|_| "Enter a whole number.".to_string()),
            )
        });
        let price = non_empty(params.price).and_then(|raw| {
            errors.check(
                "price",
                raw.parse::<f64>()
                    .ok()
                    .filter(|value| value.is_finite())
                    .ok_or_else(|| INVALID_NUMBER_MESSAGE.to_string()),
            )
        });
        let ordering = match non_empty(params.ordering) {
            Some(raw) => errors
                .check("ordering", BookOrdering::parse(&raw))
                .unwrap_or_default(),
            None => BookOrdering::default(),
        };
        errors.into_result()?;

        let search_terms = params
            .search
            .as_deref()
            .map(split_search_terms)
            .unwrap_or_default();

        Ok(Self {
            filter: BookFilter {
                title: non_empty(params.title),
                author: non_empty(params.author),
                publication_year,
                price,
            },
            search_terms,
            ordering,
        })
    }

    /// Conjunction of every supplied filter and every search term.
    pub(crate) fn matches(&self, book: &Book) -> bool {
        let filter = &self.filter;
        filter.title.as_ref().is_none_or(|title| &book.title == title)
            && filter.author.as_ref().is_none_or(|author| &book.author == author)
            && filter
                .publication_year
                .is_none_or(|year| book.publication_year == Some(year))
            && filter.price.is_none_or(|price| book.price == price)
            && self.matches_search(book)
    }

    fn matches_search(&self, book: &Book) -> bool {
        if self.search_terms.is_empty() {
            return true;
        }
        let title = book.title.to_lowercase();
        let author = book.author.to_lowercase();
        self.search_terms
            .iter()
            .all(|term| title.contains(term.as_str()) || author.contains(term.as_str()))
    }

    /// Total order: the requested field first, then id ascending.
    ///
    /// Books without a publication year go last in either direction.
    pub(crate) fn compare(&self, a: &Book, b: &Book) -> Ordering {
        let direction = self.ordering.direction;
        let primary = match self.ordering.field {
            SortField::Id => direction.apply(a.id.cmp(&b.id)),
            SortField::Title => direction.apply(a.title.cmp(&b.title)),
            SortField::Author => direction.apply(a.author.cmp(&b.author)),
            SortField::Price => direction.apply(a.price.total_cmp(&b.price)),
            SortField::PublicationYear => match (a.publication_year, b.publication_year) {
                (Some(x), Some(y)) => direction.apply(x.cmp(&y)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }

    pub(crate) fn apply(&self, books: impl IntoIterator<Item = Book>) -> Vec<Book> {
        let mut matched: Vec<Book> = books.into_iter().filter(|book| self.matches(book)).collect();
        matched.sort_by(|a, b| self.compare(a, b));
        matched
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn split_search_terms(raw: &str) -> Vec<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{BookOrdering, BookQuery, Direction, ListBooksParams, SortField};
    use crate::domain::book::Book;
    use crate::domain::error::DomainError;

    fn book(id: i64, title: &str, author: &str, year: Option<i32>, price: f64) -> Book {
        Book {
            id,
            title: title.to_string(),
            author_id: id * 10,
            author: author.to_string(),
            publication_year: year,
            description: String::new(),
            price,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn shelf() -> Vec<Book> {
        vec![
            book(1, "Django for Beginners", "William S.", Some(2018), 10.0),
            book(2, "Advanced Django", "John D.", Some(2021), 20.0),
            book(3, "Rust in Action", "Tim McNamara", None, 20.0),
        ]
    }

    fn query(params: ListBooksParams) -> BookQuery {
        BookQuery::from_params(params).expect("params must be valid")
    }

    fn ids(books: &[Book]) -> Vec<i64> {
        books.iter().map(|book| book.id).collect()
    }

    #[test]
    fn search_matches_title_case_insensitively() {
        let q = query(ListBooksParams {
            search: Some("django".to_string()),
            ..ListBooksParams::default()
        });
        let result = q.apply(shelf());
        assert_eq!(ids(&result), vec![2, 1]);
    }

    #[test]
    fn search_matches_author_name_and_requires_every_term() {
        let q = query(ListBooksParams {
            search: Some("mcnamara rust".to_string()),
            ..ListBooksParams::default()
        });
        assert_eq!(ids(&q.apply(shelf())), vec![3]);

        let q = query(ListBooksParams {
            search: Some("django, mcnamara".to_string()),
            ..ListBooksParams::default()
        });
        assert!(q.apply(shelf()).is_empty());
    }

    #[test]
    fn exact_price_filter_returns_matching_subset() {
        let q = query(ListBooksParams {
            price: Some("20".to_string()),
            ..ListBooksParams::default()
        });
        let result = q.apply(shelf());
        assert_eq!(ids(&result), vec![2, 3]);
        assert!(result.iter().all(|book| book.price == 20.0));
    }

    #[test]
    fn filters_and_search_are_conjunctive() {
        let q = query(ListBooksParams {
            search: Some("Django".to_string()),
            price: Some("20".to_string()),
            ..ListBooksParams::default()
        });
        assert_eq!(ids(&q.apply(shelf())), vec![2]);

        let q = query(ListBooksParams {
            author: Some("William S.".to_string()),
            publication_year: Some("2018".to_string()),
            ..ListBooksParams::default()
        });
        assert_eq!(ids(&q.apply(shelf())), vec![1]);
    }

    #[test]
    fn title_filter_is_exact() {
        let q = query(ListBooksParams {
            title: Some("Advanced".to_string()),
            ..ListBooksParams::default()
        });
        assert!(q.apply(shelf()).is_empty());
    }

    #[test]
    fn ordering_by_price_breaks_ties_by_id() {
        let q = query(ListBooksParams {
            ordering: Some("price".to_string()),
            ..ListBooksParams::default()
        });
        let result = q.apply(shelf());
        assert_eq!(ids(&result), vec![1, 2, 3]);
        assert!(result.windows(2).all(|pair| pair[0].price <= pair[1].price));
    }

    #[test]
    fn descending_ordering_keeps_id_tie_break_ascending() {
        let q = query(ListBooksParams {
            ordering: Some("-price".to_string()),
            ..ListBooksParams::default()
        });
        assert_eq!(ids(&q.apply(shelf())), vec![2, 3, 1]);
    }

    #[test]
    fn missing_publication_year_sorts_last() {
        for raw in ["publication_year", "-publication_year"] {
            let q = query(ListBooksParams {
                ordering: Some(raw.to_string()),
                ..ListBooksParams::default()
            });
            let result = q.apply(shelf());
            assert_eq!(result.last().map(|book| book.id), Some(3), "{raw}");
        }
    }

    #[test]
    fn default_ordering_is_by_title() {
        let q = query(ListBooksParams::default());
        assert_eq!(
            q.ordering,
            BookOrdering {
                field: SortField::Title,
                direction: Direction::Asc
            }
        );
        assert_eq!(ids(&q.apply(shelf())), vec![2, 1, 3]);
    }

    #[test]
    fn blank_params_are_ignored() {
        let q = query(ListBooksParams {
            search: Some("   ".to_string()),
            title: Some(String::new()),
            price: Some(" ".to_string()),
            ..ListBooksParams::default()
        });
        assert_eq!(q.apply(shelf()).len(), 3);
    }

    #[test]
    fn invalid_params_are_reported_per_field() {
        let err = BookQuery::from_params(ListBooksParams {
            ordering: Some("description".to_string()),
            price: Some("cheap".to_string()),
            publication_year: Some("1.5".to_string()),
            ..ListBooksParams::default()
        })
        .expect_err("must be rejected");

        match err {
            DomainError::Validation(fields) => {
                for field in ["ordering", "price", "publication_year"] {
                    assert!(fields.get(field).is_some(), "{field} must be reported");
                }
            }
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
