use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum RelayError {
    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("request body too large")]
    PayloadTooLarge,

    #[error("Server configuration error: API key is missing.")]
    MissingApiKey,

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Upstream error with status: {status}")]
    UpstreamStatus { status: StatusCode, body: String },

    #[error("malformed upstream response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("upstream returned no candidates and no block reason")]
    EmptyResponse,
}

impl RelayError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            RelayError::BadRequest(_) | RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            RelayError::MissingApiKey
            | RelayError::Reqwest(_)
            | RelayError::UrlParse(_)
            | RelayError::UpstreamStatus { .. }
            | RelayError::MalformedResponse(_)
            | RelayError::EmptyResponse => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Whether repeating the same upstream call could plausibly succeed.
pub trait IsRetryable {
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for RelayError {
    fn is_retryable(&self) -> bool {
        match self {
            RelayError::Reqwest(e) => !e.is_builder() && !e.is_decode(),
            RelayError::UpstreamStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let body = match self {
            RelayError::MethodNotAllowed => ApiErrorBody::new("Method Not Allowed"),
            RelayError::BadRequest(msg) => ApiErrorBody::new(msg),
            RelayError::Validation(errors) => ApiErrorBody::new("Invalid request body.")
                .with_message(describe_validation(&errors)),
            RelayError::PayloadTooLarge => ApiErrorBody::new("PayloadTooLarge")
                .with_message("request body too large"),
            RelayError::MissingApiKey => {
                ApiErrorBody::new("Server configuration error: API key is missing.")
            }
            RelayError::Reqwest(_) | RelayError::UrlParse(_) => ApiErrorBody::new("UpstreamError")
                .with_message("The AI service is currently unavailable. Please try again."),
            RelayError::UpstreamStatus { status, .. } => {
                let msg = match status {
                    StatusCode::TOO_MANY_REQUESTS => "The AI service is busy. Please try again later.",
                    StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                        "The AI service rejected the server credentials."
                    }
                    _ => "Failed to get a response from the AI model.",
                };
                ApiErrorBody::new("UpstreamError").with_message(msg)
            }
            RelayError::MalformedResponse(_) | RelayError::EmptyResponse => {
                ApiErrorBody::new("EmptyResponse")
                    .with_message("The AI returned an empty or invalid response.")
            }
        };
        (status, Json(body)).into_response()
    }
}

/// One `field: message` line per failing field, in field order.
fn describe_validation(errors: &validator::ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    fields
        .into_iter()
        .map(|(field, errs)| {
            let reasons: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            format!("{field}: {}", reasons.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Standardized API error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiErrorBody {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
        }
    }

    fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
