pub(crate) mod author_repository;
pub(crate) mod book_repository;
pub(crate) mod repositories;
pub(crate) mod token_repository;
pub(crate) mod user_repository;
