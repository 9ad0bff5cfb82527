use axum::extract::{FromRequest, FromRequestParts};

use crate::error::AppError;

/// `Json` whose rejections render as `AppError::BadRequest`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejections render as `AppError::BadRequest`
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
