pub(crate) mod accounts;
pub(crate) mod authors;
pub(crate) mod books;
