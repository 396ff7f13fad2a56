use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::validation::Validate;

/// JSON body that has passed `Validate`. Rejections render as `ApiError`
/// envelopes rather than axum's plain-text bodies.
pub struct Valid<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate().map_err(|errors| {
            ApiError::validation_error(errors.summary(), Some(errors.into_fields()))
        })?;
        Ok(Valid(value))
    }
}
