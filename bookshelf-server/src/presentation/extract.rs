//! Extractor wrappers whose rejections render as `AppError` bodies.

use axum::extract::{FromRequest, FromRequestParts, Path, Query};

use crate::presentation::app_error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub(crate) struct AppJson<T>(pub(crate) T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Query), rejection(AppError))]
pub(crate) struct AppQuery<T>(pub(crate) T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub(crate) struct AppPath<T>(pub(crate) T);
