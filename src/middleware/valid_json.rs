use axum::Json;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;
use validator::Validate;

use crate::error::RelayError;

/// JSON body that has been parsed into `T` and passed its [`Validate`] rules.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = RelayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            debug!(reason = %rejection.body_text(), "rejected request body");
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                RelayError::PayloadTooLarge
            } else {
                RelayError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
            }
        })?;
        body.validate()
            .inspect_err(|errors| debug!(%errors, "request body failed validation"))?;
        Ok(ValidJson(body))
    }
}
