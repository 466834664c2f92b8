use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `bookshelf-client`.
pub enum BookshelfClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен или неверные учётные данные).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Ресурс уже существует или всё ещё используется.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Некорректный запрос или ошибка валидации.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Сервер не смог обработать запрос (ответ 5xx).
    #[error("server error: {0}")]
    Server(String),
}

/// Результат операций `bookshelf-client`.
pub type BookshelfClientResult<T> = Result<T, BookshelfClientError>;

impl BookshelfClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized(message)
            }
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            reqwest::StatusCode::CONFLICT => Self::Conflict(message),
            status if status.is_server_error() => Self::Server(message),
            _ => Self::InvalidRequest(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }

    pub(crate) fn missing_token() -> Self {
        Self::Unauthorized("token is not set, log in first".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::BookshelfClientError;

    #[test]
    fn statuses_map_to_variants() {
        use reqwest::StatusCode;

        assert!(matches!(
            BookshelfClientError::from_http_status(StatusCode::UNAUTHORIZED, None),
            BookshelfClientError::Unauthorized(_)
        ));
        assert!(matches!(
            BookshelfClientError::from_http_status(StatusCode::NOT_FOUND, None),
            BookshelfClientError::NotFound
        ));
        assert!(matches!(
            BookshelfClientError::from_http_status(StatusCode::CONFLICT, Some("taken".into())),
            BookshelfClientError::Conflict(message) if message == "taken"
        ));
        assert!(matches!(
            BookshelfClientError::from_http_status(StatusCode::BAD_REQUEST, None),
            BookshelfClientError::InvalidRequest(message) if message.contains("400")
        ));
    }

    #[test]
    fn server_failures_are_not_reported_as_invalid_requests() {
        use reqwest::StatusCode;

        for status in [
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert!(matches!(
                BookshelfClientError::from_http_status(status, Some("internal error".into())),
                BookshelfClientError::Server(message) if message == "internal error"
            ));
        }
    }
}
