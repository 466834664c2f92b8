use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, header};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{BookshelfClientError, BookshelfClientResult};
use crate::models::{
    Author, AuthResponse, Book, BookInput, BookListQuery, ProfileUpdate, Registration, User,
};

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateAuthorRequestDto<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
    #[serde(default)]
    fields: BTreeMap<String, Vec<String>>,
}

impl ErrorResponseDto {
    fn into_message(self, status: reqwest::StatusCode) -> String {
        let error = self
            .error
            .unwrap_or_else(|| format!("http status {status}"));
        if self.fields.is_empty() {
            return error;
        }

        let fields = self
            .fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
            .collect::<Vec<_>>()
            .join("; ");
        format!("{error} ({fields})")
    }
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `bookshelf-server`.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    pub fn new(base_url: impl Into<String>) -> BookshelfClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.header(header::AUTHORIZATION, format!("Token {token}")),
            None => request,
        }
    }

    async fn decode_error(response: reqwest::Response) -> BookshelfClientError {
        let status = response.status();

        let message = match response.json::<ErrorResponseDto>().await {
            Ok(body) => body.into_message(status),
            Err(_) => format!("http status {status}"),
        };
        BookshelfClientError::from_http_status(status, Some(message))
    }

    async fn execute(request: RequestBuilder) -> BookshelfClientResult<reqwest::Response> {
        let response = request
            .send()
            .await
            .map_err(BookshelfClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    async fn fetch<TRes>(request: RequestBuilder) -> BookshelfClientResult<TRes>
    where
        TRes: DeserializeOwned,
    {
        Self::execute(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(BookshelfClientError::from_reqwest)
    }

    /// универсальный helper для отправки запросов с json-payload
    async fn send_json<TReq, TRes>(
        &self,
        method: Method,
        path: &str,
        body: &TReq,
        token: Option<&str>,
    ) -> BookshelfClientResult<TRes>
    where
        TReq: Serialize,
        TRes: DeserializeOwned,
    {
        Self::fetch(self.request(method, path, token).json(body)).await
    }

    /// Регистрирует пользователя и возвращает токен + данные пользователя.
    pub async fn register(&self, registration: &Registration) -> BookshelfClientResult<AuthResponse> {
        self.send_json(Method::POST, "/api/accounts/register", registration, None)
            .await
    }

    /// Выполняет вход и возвращает токен + данные пользователя.
    pub async fn login(&self, username: &str, password: &str) -> BookshelfClientResult<AuthResponse> {
        let payload = LoginRequestDto { username, password };
        self.send_json(Method::POST, "/api/accounts/login", &payload, None)
            .await
    }

    /// Отзывает токен на сервере.
    pub async fn logout(&self, token: &str) -> BookshelfClientResult<()> {
        Self::execute(self.request(Method::POST, "/api/accounts/logout", Some(token))).await?;
        Ok(())
    }

    /// Возвращает профиль владельца токена.
    pub async fn profile(&self, token: &str) -> BookshelfClientResult<User> {
        Self::fetch(self.request(Method::GET, "/api/accounts/profile", Some(token))).await
    }

    /// Частично обновляет профиль владельца токена.
    pub async fn update_profile(
        &self,
        token: &str,
        update: &ProfileUpdate,
    ) -> BookshelfClientResult<User> {
        self.send_json(Method::PUT, "/api/accounts/profile", update, Some(token))
            .await
    }

    /// Подписывается на пользователя и возвращает обновлённый профиль.
    pub async fn follow(&self, token: &str, user_id: i64) -> BookshelfClientResult<User> {
        let path = format!("/api/accounts/follow/{user_id}");
        Self::fetch(self.request(Method::POST, &path, Some(token))).await
    }

    /// Отписывается от пользователя и возвращает обновлённый профиль.
    pub async fn unfollow(&self, token: &str, user_id: i64) -> BookshelfClientResult<User> {
        let path = format!("/api/accounts/follow/{user_id}");
        Self::fetch(self.request(Method::DELETE, &path, Some(token))).await
    }

    /// Возвращает книги, подходящие под запрос.
    pub async fn list_books(&self, query: &BookListQuery) -> BookshelfClientResult<Vec<Book>> {
        Self::fetch(self.request(Method::GET, "/api/books", None).query(query)).await
    }

    /// Получает книгу по идентификатору.
    pub async fn get_book(&self, id: i64) -> BookshelfClientResult<Book> {
        Self::fetch(self.request(Method::GET, &format!("/api/books/{id}"), None)).await
    }

    /// Создаёт книгу.
    ///
    /// Требует валидный токен.
    pub async fn create_book(&self, token: &str, book: &BookInput) -> BookshelfClientResult<Book> {
        self.send_json(Method::POST, "/api/books", book, Some(token))
            .await
    }

    /// Заменяет все поля книги.
    ///
    /// Требует валидный токен.
    pub async fn update_book(
        &self,
        token: &str,
        id: i64,
        book: &BookInput,
    ) -> BookshelfClientResult<Book> {
        self.send_json(Method::PUT, &format!("/api/books/{id}"), book, Some(token))
            .await
    }

    /// Удаляет книгу.
    ///
    /// Требует валидный токен.
    pub async fn delete_book(&self, token: &str, id: i64) -> BookshelfClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/api/books/{id}"), Some(token)))
            .await?;
        Ok(())
    }

    /// Возвращает всех авторов.
    pub async fn list_authors(&self) -> BookshelfClientResult<Vec<Author>> {
        Self::fetch(self.request(Method::GET, "/api/authors", None)).await
    }

    /// Получает автора по идентификатору.
    pub async fn get_author(&self, id: i64) -> BookshelfClientResult<Author> {
        Self::fetch(self.request(Method::GET, &format!("/api/authors/{id}"), None)).await
    }

    /// Создаёт автора.
    ///
    /// Требует валидный токен.
    pub async fn create_author(&self, token: &str, name: &str) -> BookshelfClientResult<Author> {
        let payload = CreateAuthorRequestDto { name };
        self.send_json(Method::POST, "/api/authors", &payload, Some(token))
            .await
    }

    /// Удаляет автора без книг.
    ///
    /// Требует валидный токен.
    pub async fn delete_author(&self, token: &str, id: i64) -> BookshelfClientResult<()> {
        Self::execute(self.request(Method::DELETE, &format!("/api/authors/{id}"), Some(token)))
            .await?;
        Ok(())
    }
}
