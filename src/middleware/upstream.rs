use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;
use tracing::error;

use crate::api::gemini_api::GeminiClient;
use crate::error::RelayError;
use crate::router::RelayState;
use crate::service::retry::RetryPolicy;

/// Upstream access for one invocation.
///
/// Extracted before the body so a missing server credential is reported
/// regardless of what the caller sent.
#[derive(Debug, Clone)]
pub struct Upstream {
    pub client: Arc<GeminiClient>,
    pub retry: RetryPolicy,
}

impl FromRequestParts<RelayState> for Upstream {
    type Rejection = RelayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &RelayState,
    ) -> Result<Self, Self::Rejection> {
        let Some(client) = state.gemini.clone() else {
            error!(path = %parts.uri.path(), "GEMINI_API_KEY is not configured");
            return Err(RelayError::MissingApiKey);
        };
        Ok(Self {
            client,
            retry: state.retry,
        })
    }
}
