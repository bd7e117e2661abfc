//! Request extractors whose rejections use the `{ "error": message }` shape.

use axum::extract::FromRequest;

use crate::domain::DomainError;

/// `Json<T>` with malformed bodies and missing fields answered as 400.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(DomainError))]
pub struct JsonBody<T>(pub T);
