pub mod auth;
pub mod learners;
pub mod progress;

use axum::extract::FromRequest;

use crate::error::ApiError;

/// JSON extractor that reports body rejections as `ApiError`.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);
