pub(crate) mod access;
pub(crate) mod account_service;
pub(crate) mod catalog_service;
