//! In-memory store implementing every repository trait.
//!
//! Used when no `DATABASE_URL` is configured and as the store behind the
//! router tests. All tables live behind one lock so cross-table rules
//! (author must exist, author delete is restricted) hold atomically.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::data::author_repository::AuthorRepository;
use crate::data::book_repository::{BookPatch, BookRepository, NewBook};
use crate::data::token_repository::TokenRepository;
use crate::data::user_repository::{NewUser, ProfilePatch, UserCredentials, UserRepository};
use crate::domain::book::{Author, AuthorSummary, Book};
use crate::domain::error::DomainError;
use crate::domain::query::BookQuery;
use crate::domain::user::{AuthToken, User};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Tables {
    authors: BTreeMap<i64, Author>,
    books: BTreeMap<i64, Book>,
    users: BTreeMap<i64, StoredUser>,
    /// (follower_id, followee_id)
    follows: BTreeSet<(i64, i64)>,
    tokens: HashMap<i64, AuthToken>,
    last_author_id: i64,
    last_book_id: i64,
    last_user_id: i64,
}

impl Tables {
    fn author(&self, id: i64) -> Result<&Author, DomainError> {
        self.authors
            .get(&id)
            .ok_or_else(|| DomainError::NotFound(format!("author id: {id}")))
    }

    fn books_by_author(&self, author_id: i64) -> i64 {
        self.books
            .values()
            .filter(|book| book.author_id == author_id)
            .count() as i64
    }

    fn user_view(&self, stored: &StoredUser) -> User {
        let id = stored.user.id;
        let mut user = stored.user.clone();
        user.followers = self
            .follows
            .iter()
            .filter(|(_, followee)| *followee == id)
            .map(|(follower, _)| *follower)
            .collect();
        user.following = self
            .follows
            .iter()
            .filter(|(follower, _)| *follower == id)
            .map(|(_, followee)| *followee)
            .collect();
        user
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookRepository for InMemoryStore {
    async fn create_book(&self, input: NewBook) -> Result<Book, DomainError> {
        let mut tables = self.tables.write().await;
        let author = tables.author(input.author_id)?.name.clone();

        tables.last_book_id += 1;
        let now = Utc::now();
        let book = Book {
            id: tables.last_book_id,
            title: input.title,
            author_id: input.author_id,
            author,
            publication_year: input.publication_year,
            description: input.description,
            price: input.price,
            created_at: now,
            updated_at: now,
        };
        tables.books.insert(book.id, book.clone());
        Ok(book)
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>, DomainError> {
        Ok(self.tables.read().await.books.get(&id).cloned())
    }

    async fn list_books(&self, query: &BookQuery) -> Result<Vec<Book>, DomainError> {
        let tables = self.tables.read().await;
        Ok(query.apply(tables.books.values().cloned()))
    }

    async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Option<Book>, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.books.contains_key(&id) {
            return Ok(None);
        }
        let author = tables.author(patch.author_id)?.name.clone();

        let Some(book) = tables.books.get_mut(&id) else {
            return Ok(None);
        };
        book.title = patch.title;
        book.author_id = patch.author_id;
        book.author = author;
        book.publication_year = patch.publication_year;
        book.description = patch.description;
        book.price = patch.price;
        book.updated_at = Utc::now();
        Ok(Some(book.clone()))
    }

    async fn delete_book(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.tables.write().await.books.remove(&id).is_some())
    }

    async fn count_by_author(&self, author_id: i64) -> Result<i64, DomainError> {
        Ok(self.tables.read().await.books_by_author(author_id))
    }
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn create_author(&self, name: &str) -> Result<Author, DomainError> {
        let mut tables = self.tables.write().await;
        if tables.authors.values().any(|author| author.name == name) {
            return Err(DomainError::AlreadyExists("author name".to_string()));
        }

        tables.last_author_id += 1;
        let author = Author {
            id: tables.last_author_id,
            name: name.to_string(),
        };
        tables.authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn get_author(&self, id: i64) -> Result<Option<Author>, DomainError> {
        Ok(self.tables.read().await.authors.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Author>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .authors
            .values()
            .find(|author| author.name == name)
            .cloned())
    }

    async fn list_authors(&self) -> Result<Vec<AuthorSummary>, DomainError> {
        let tables = self.tables.read().await;
        let mut authors: Vec<AuthorSummary> = tables
            .authors
            .values()
            .map(|author| AuthorSummary {
                id: author.id,
                name: author.name.clone(),
                book_count: tables.books_by_author(author.id),
            })
            .collect();
        authors.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(authors)
    }

    async fn delete_author(&self, id: i64) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.authors.contains_key(&id) {
            return Ok(false);
        }
        let referenced = tables.books_by_author(id);
        if referenced > 0 {
            return Err(DomainError::Conflict(format!(
                "author id {id} is referenced by {referenced} book(s)"
            )));
        }
        Ok(tables.authors.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|stored| stored.user.username == input.username)
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }

        tables.last_user_id += 1;
        let user = User {
            id: tables.last_user_id,
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            bio: input.bio,
            profile_picture: None,
            followers: Vec::new(),
            following: Vec::new(),
            date_joined: Utc::now(),
        };
        tables.users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: input.password_hash,
            },
        );
        Ok(user)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|stored| stored.user.username == username)
            .map(|stored| UserCredentials {
                user: tables.user_view(stored),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn get_user(&self, id: i64) -> Result<Option<User>, DomainError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).map(|stored| tables.user_view(stored)))
    }

    async fn update_profile(
        &self,
        id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let mut tables = self.tables.write().await;
        let Some(stored) = tables.users.get_mut(&id) else {
            return Ok(None);
        };

        let user = &mut stored.user;
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(first_name) = patch.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            user.last_name = last_name;
        }
        if let Some(bio) = patch.bio {
            user.bio = bio;
        }
        if let Some(profile_picture) = patch.profile_picture {
            user.profile_picture = profile_picture;
        }

        let stored = stored.clone();
        Ok(Some(tables.user_view(&stored)))
    }

    async fn follow(&self, follower_id: i64, followee_id: i64) -> Result<bool, DomainError> {
        let mut tables = self.tables.write().await;
        for id in [follower_id, followee_id] {
            if !tables.users.contains_key(&id) {
                return Err(DomainError::NotFound(format!("user id: {id}")));
            }
        }
        Ok(tables.follows.insert((follower_id, followee_id)))
    }

    async fn unfollow(&self, follower_id: i64, followee_id: i64) -> Result<bool, DomainError> {
        Ok(self
            .tables
            .write()
            .await
            .follows
            .remove(&(follower_id, followee_id)))
    }
}

#[async_trait]
impl TokenRepository for InMemoryStore {
    async fn get_or_create(
        &self,
        user_id: i64,
        candidate_key: &str,
    ) -> Result<AuthToken, DomainError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(DomainError::NotFound(format!("user id: {user_id}")));
        }
        let token = tables.tokens.entry(user_id).or_insert_with(|| AuthToken {
            key: candidate_key.to_string(),
            user_id,
            created_at: Utc::now(),
        });
        Ok(token.clone())
    }

    async fn find_user_id(&self, key: &str) -> Result<Option<i64>, DomainError> {
        Ok(self
            .tables
            .read()
            .await
            .tokens
            .values()
            .find(|token| token.key == key)
            .map(|token| token.user_id))
    }

    async fn revoke(&self, user_id: i64) -> Result<bool, DomainError> {
        Ok(self.tables.write().await.tokens.remove(&user_id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryStore;
    use crate::data::author_repository::AuthorRepository;
    use crate::data::book_repository::{BookPatch, BookRepository, NewBook};
    use crate::data::token_repository::TokenRepository;
    use crate::data::user_repository::{NewUser, ProfilePatch, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::query::{BookQuery, ListBooksParams};

    fn new_book(title: &str, author_id: i64, price: f64) -> NewBook {
        NewBook {
            title: title.to_string(),
            author_id,
            publication_year: None,
            description: String::new(),
            price,
        }
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            first_name: String::new(),
            last_name: String::new(),
            bio: String::new(),
            password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    async fn create_book_requires_existing_author() {
        let store = InMemoryStore::new();
        let err = store
            .create_book(new_book("Orphan", 42, 1.0))
            .await
            .expect_err("author must exist");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn books_carry_author_name_and_sequential_ids() {
        let store = InMemoryStore::new();
        let author = store.create_author("William S.").await.expect("author");

        let first = store
            .create_book(new_book("Django for Beginners", author.id, 10.0))
            .await
            .expect("book");
        let second = store
            .create_book(new_book("Django for Pros", author.id, 12.0))
            .await
            .expect("book");

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.author, "William S.");
        assert_eq!(store.count_by_author(author.id).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_books() {
        let store = InMemoryStore::new();
        let author = store.create_author("A").await.expect("author");
        let patch = BookPatch {
            title: "t".to_string(),
            author_id: author.id,
            publication_year: Some(2000),
            description: String::new(),
            price: 1.0,
        };

        assert!(store.update_book(7, patch).await.expect("update").is_none());
        assert!(!store.delete_book(7).await.expect("delete"));
    }

    #[tokio::test]
    async fn deleted_book_disappears_from_list() {
        let store = InMemoryStore::new();
        let author = store.create_author("A").await.expect("author");
        let book = store
            .create_book(new_book("Gone", author.id, 1.0))
            .await
            .expect("book");

        assert!(store.delete_book(book.id).await.expect("delete"));
        let query = BookQuery::from_params(ListBooksParams::default()).expect("query");
        assert!(store.list_books(&query).await.expect("list").is_empty());
        assert!(store.get_book(book.id).await.expect("get").is_none());
    }

    #[tokio::test]
    async fn author_delete_is_restricted_while_referenced() {
        let store = InMemoryStore::new();
        let author = store.create_author("A").await.expect("author");
        let book = store
            .create_book(new_book("t", author.id, 1.0))
            .await
            .expect("book");

        let err = store
            .delete_author(author.id)
            .await
            .expect_err("must be restricted");
        assert!(matches!(err, DomainError::Conflict(_)));

        store.delete_book(book.id).await.expect("delete book");
        assert!(store.delete_author(author.id).await.expect("delete author"));
    }

    #[tokio::test]
    async fn author_names_are_unique() {
        let store = InMemoryStore::new();
        store.create_author("A").await.expect("author");
        let err = store.create_author("A").await.expect_err("duplicate");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = InMemoryStore::new();
        store.create_user(new_user("jane")).await.expect("user");
        let err = store
            .create_user(new_user("jane"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn follows_are_reflected_on_both_users() {
        let store = InMemoryStore::new();
        let jane = store.create_user(new_user("jane")).await.expect("user");
        let john = store.create_user(new_user("john")).await.expect("user");

        assert!(store.follow(jane.id, john.id).await.expect("follow"));
        assert!(!store.follow(jane.id, john.id).await.expect("follow again"));

        let jane = store.get_user(jane.id).await.expect("get").expect("jane");
        let john = store.get_user(john.id).await.expect("get").expect("john");
        assert_eq!(jane.following, vec![john.id]);
        assert_eq!(john.followers, vec![jane.id]);

        assert!(store.unfollow(jane.id, john.id).await.expect("unfollow"));
        let john = store.get_user(john.id).await.expect("get").expect("john");
        assert!(john.followers.is_empty());
    }

    #[tokio::test]
    async fn profile_patch_updates_only_given_fields() {
        let store = InMemoryStore::new();
        let jane = store.create_user(new_user("jane")).await.expect("user");

        let patch = ProfilePatch {
            bio: Some("reader".to_string()),
            profile_picture: Some(Some("avatars/jane.png".to_string())),
            ..ProfilePatch::default()
        };
        let updated = store
            .update_profile(jane.id, patch)
            .await
            .expect("update")
            .expect("jane");

        assert_eq!(updated.bio, "reader");
        assert_eq!(updated.email, "jane@example.com");
        assert_eq!(updated.profile_picture.as_deref(), Some("avatars/jane.png"));
    }

    #[tokio::test]
    async fn token_is_created_once_per_user() {
        let store = InMemoryStore::new();
        let jane = store.create_user(new_user("jane")).await.expect("user");

        let first = store.get_or_create(jane.id, "key-1").await.expect("token");
        let second = store.get_or_create(jane.id, "key-2").await.expect("token");
        assert_eq!(first.key, "key-1");
        assert_eq!(second.key, "key-1");
        assert_eq!(store.find_user_id("key-1").await.expect("find"), Some(jane.id));

        assert!(store.revoke(jane.id).await.expect("revoke"));
        assert_eq!(store.find_user_id("key-1").await.expect("find"), None);
        let third = store.get_or_create(jane.id, "key-3").await.expect("token");
        assert_eq!(third.key, "key-3");
    }
}
