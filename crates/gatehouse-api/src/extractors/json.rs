//! JSON body extractor that runs `validator` rules.

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use gatehouse_core::error::AppError;

use crate::error::ApiError;

/// A deserialized and validated JSON body. Malformed bodies become the
/// standard `VALIDATION_ERROR` envelope instead of Axum's plain-text
/// rejection.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::validation(format!("Invalid JSON body: {}", e.body_text())))?;
        value.validate()?;
        Ok(Self(value))
    }
}
