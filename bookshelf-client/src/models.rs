use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email (может быть пустым).
    pub email: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// О себе.
    pub bio: String,
    /// Ссылка на аватар.
    pub profile_picture: Option<String>,
    /// Идентификаторы подписчиков.
    pub followers: Vec<i64>,
    /// Идентификаторы пользователей, на которых подписан пользователь.
    pub following: Vec<i64>,
    /// Дата регистрации (UTC).
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// Данные пользователя.
    pub user: User,
    /// API-токен для заголовка `Authorization: Token <key>`.
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная модель книги.
pub struct Book {
    /// Идентификатор книги.
    pub id: i64,
    /// Название.
    pub title: String,
    /// Имя автора.
    pub author: String,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Год издания.
    pub publication_year: Option<i32>,
    /// Описание.
    pub description: String,
    /// Цена.
    pub price: f64,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего обновления (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Автор с количеством его книг.
pub struct Author {
    /// Идентификатор автора.
    pub id: i64,
    /// Имя автора.
    pub name: String,
    /// Количество книг автора.
    pub book_count: i64,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Данные для регистрации.
pub struct Registration {
    /// Логин.
    pub username: String,
    /// Email (может быть пустым).
    pub email: String,
    /// Пароль.
    pub password: String,
    /// Повтор пароля, должен совпадать с `password`.
    pub password2: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// О себе.
    pub bio: String,
}

#[derive(Debug, Clone, Serialize)]
/// Поля книги для создания и полной замены.
pub struct BookInput {
    /// Название.
    pub title: String,
    /// Имя автора; неизвестный автор создаётся сервером.
    pub author: String,
    /// Год издания.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    /// Описание.
    pub description: String,
    /// Цена.
    pub price: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Частичное обновление профиля: `None` оставляет поле без изменений.
pub struct ProfileUpdate {
    /// Email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Имя.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Фамилия.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// О себе.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Ссылка на аватар; пустая строка удаляет его.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
/// Параметры поиска, фильтрации и сортировки списка книг.
pub struct BookListQuery {
    /// Слова для поиска по названию и имени автора.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Поле сортировки, префикс `-` сортирует по убыванию.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
    /// Точное совпадение названия.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Точное совпадение имени автора.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Точное совпадение года издания.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    /// Точное совпадение цены.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}
