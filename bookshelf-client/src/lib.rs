//! Клиентская библиотека для работы с bookshelf-server по HTTP.
//!
//! Предоставляет единый API (`BookshelfClient`) поверх REST-эндпоинтов
//! каталога книг, авторов и учётных записей.
//!
//! Клиент хранит API-токен после `register`/`login` и автоматически
//! использует его в защищённых операциях.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{BookshelfClientError, BookshelfClientResult};
pub use models::{
    Author, AuthResponse, Book, BookInput, BookListQuery, ProfileUpdate, Registration, User,
};

use http_client::HttpClient;

#[derive(Debug, Clone)]
/// Клиент для работы с сервисом каталога книг.
pub struct BookshelfClient {
    http_client: HttpClient,
    token: Option<String>,
}

impl BookshelfClient {
    /// Создаёт клиент для сервера с базовым URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BookshelfClientResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный токен в клиенте.
    pub async fn register(
        &mut self,
        registration: &Registration,
    ) -> BookshelfClientResult<AuthResponse> {
        let result = self.http_client.register(registration).await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    /// Выполняет вход пользователя и сохраняет полученный токен в клиенте.
    ///
    /// Повторный вход возвращает тот же токен, пока он не отозван.
    pub async fn login(
        &mut self,
        username: &str,
        password: &str,
    ) -> BookshelfClientResult<AuthResponse> {
        let result = self.http_client.login(username, password).await?;
        self.token = Some(result.token.clone());
        Ok(result)
    }

    /// Отзывает токен на сервере и очищает его в клиенте.
    pub async fn logout(&mut self) -> BookshelfClientResult<()> {
        let token = self.require_token()?;
        self.http_client.logout(token).await?;
        self.token = None;
        Ok(())
    }

    /// Возвращает профиль текущего пользователя.
    pub async fn profile(&self) -> BookshelfClientResult<User> {
        let token = self.require_token()?;
        self.http_client.profile(token).await
    }

    /// Частично обновляет профиль текущего пользователя.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> BookshelfClientResult<User> {
        let token = self.require_token()?;
        self.http_client.update_profile(token, update).await
    }

    /// Подписывает текущего пользователя на `user_id`.
    pub async fn follow(&self, user_id: i64) -> BookshelfClientResult<User> {
        let token = self.require_token()?;
        self.http_client.follow(token, user_id).await
    }

    /// Отписывает текущего пользователя от `user_id`.
    pub async fn unfollow(&self, user_id: i64) -> BookshelfClientResult<User> {
        let token = self.require_token()?;
        self.http_client.unfollow(token, user_id).await
    }

    /// Возвращает книги с поиском, фильтрами и сортировкой.
    pub async fn list_books(&self, query: &BookListQuery) -> BookshelfClientResult<Vec<Book>> {
        self.http_client.list_books(query).await
    }

    /// Возвращает книгу по идентификатору.
    pub async fn get_book(&self, id: i64) -> BookshelfClientResult<Book> {
        self.http_client.get_book(id).await
    }

    /// Создаёт книгу.
    ///
    /// Требует установленный токен.
    pub async fn create_book(&self, book: &BookInput) -> BookshelfClientResult<Book> {
        let token = self.require_token()?;
        self.http_client.create_book(token, book).await
    }

    /// Заменяет поля книги.
    ///
    /// Требует установленный токен.
    pub async fn update_book(&self, id: i64, book: &BookInput) -> BookshelfClientResult<Book> {
        let token = self.require_token()?;
        self.http_client.update_book(token, id, book).await
    }

    /// Удаляет книгу.
    ///
    /// Требует установленный токен.
    pub async fn delete_book(&self, id: i64) -> BookshelfClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_book(token, id).await
    }

    /// Возвращает авторов с количеством книг.
    pub async fn list_authors(&self) -> BookshelfClientResult<Vec<Author>> {
        self.http_client.list_authors().await
    }

    /// Возвращает автора по идентификатору.
    pub async fn get_author(&self, id: i64) -> BookshelfClientResult<Author> {
        self.http_client.get_author(id).await
    }

    /// Создаёт автора.
    ///
    /// Требует установленный токен.
    pub async fn create_author(&self, name: &str) -> BookshelfClientResult<Author> {
        let token = self.require_token()?;
        self.http_client.create_author(token, name).await
    }

    /// Удаляет автора, у которого нет книг.
    ///
    /// Требует установленный токен.
    pub async fn delete_author(&self, id: i64) -> BookshelfClientResult<()> {
        let token = self.require_token()?;
        self.http_client.delete_author(token, id).await
    }

    fn require_token(&self) -> BookshelfClientResult<&str> {
        self.token
            .as_deref()
            .ok_or_else(BookshelfClientError::missing_token)
    }
}
