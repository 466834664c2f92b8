pub(crate) mod book;
pub(crate) mod error;
pub(crate) mod query;
pub(crate) mod user;
pub(crate) mod validation;
