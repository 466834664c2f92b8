use std::sync::Arc;

use sqlx::PgPool;

use crate::application::account_service::AccountService;
use crate::application::catalog_service::CatalogService;
use crate::data::repositories::memory::InMemoryStore;
use crate::data::repositories::postgres::author_repository::PostgresAuthorRepository;
use crate::data::repositories::postgres::book_repository::PostgresBookRepository;
use crate::data::repositories::postgres::token_repository::PostgresTokenRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;

pub(crate) mod app_error;
pub(crate) mod extract;
pub(crate) mod handlers;
pub(crate) mod http_handlers;
pub(crate) mod middleware;
pub(crate) mod openapi;
pub(crate) mod routes;

#[cfg(test)]
mod tests;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) catalog: Arc<CatalogService>,
    pub(crate) accounts: Arc<AccountService>,
}

impl AppState {
    pub(crate) fn new(catalog: Arc<CatalogService>, accounts: Arc<AccountService>) -> Self {
        Self { catalog, accounts }
    }

    pub(crate) fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self::new(
            Arc::new(CatalogService::new(store.clone(), store.clone())),
            Arc::new(AccountService::new(store.clone(), store)),
        )
    }

    pub(crate) fn postgres(pool: PgPool) -> Self {
        let catalog = CatalogService::new(
            Arc::new(PostgresBookRepository::new(pool.clone())),
            Arc::new(PostgresAuthorRepository::new(pool.clone())),
        );
        let accounts = AccountService::new(
            Arc::new(PostgresUserRepository::new(pool.clone())),
            Arc::new(PostgresTokenRepository::new(pool)),
        );
        Self::new(Arc::new(catalog), Arc::new(accounts))
    }
}
