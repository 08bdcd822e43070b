use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::{error, info};

use crate::error::RelayError;
use crate::middleware::{upstream::Upstream, valid_json::ValidJson};
use crate::prompts;
use crate::service::extract::extract;
use crate::service::profile::{self, HandlerProfile, ResponseShape};
use crate::service::render::render;
use crate::service::retry::RetryPolicy;
use crate::types::envelope::{ChatEnvelope, DocumentEnvelope, PromptEnvelope, RefineEnvelope};
use crate::types::gemini::{Content, GenerateContentResponse};

/// Build the payload, make the upstream call and shape the reply.
pub async fn relay(
    upstream: &Upstream,
    profile: &HandlerProfile,
    contents: Vec<Content>,
) -> Result<Response, RelayError> {
    let request = profile.build_request(contents);
    let retry = if profile.retry {
        upstream.retry
    } else {
        RetryPolicy::single()
    };

    info!(
        endpoint = profile.name,
        model = upstream.client.model(),
        turns = request.contents.len(),
        "relaying to Gemini"
    );
    let raw = upstream.client.generate_content(&request, &retry).await?;

    if profile.shape == ResponseShape::Raw {
        return Ok(Json(raw).into_response());
    }

    let extraction = GenerateContentResponse::deserialize(&raw)
        .map_err(RelayError::from)
        .and_then(|parsed| extract(&parsed))
        .inspect_err(|err| {
            error!(endpoint = profile.name, error = %err, response = %raw, "unusable upstream response");
        })?;
    Ok(Json(render(profile, extraction)).into_response())
}

pub async fn chat_handler(
    upstream: Upstream,
    ValidJson(body): ValidJson<ChatEnvelope>,
) -> Result<Response, RelayError> {
    relay(&upstream, &profile::CHAT, body.into_contents()).await
}

pub async fn generate_ideas_handler(
    upstream: Upstream,
    ValidJson(body): ValidJson<PromptEnvelope>,
) -> Result<Response, RelayError> {
    relay(&upstream, &profile::IDEAS, body.into_contents()).await
}

pub async fn generate_recipe_handler(
    upstream: Upstream,
    ValidJson(body): ValidJson<PromptEnvelope>,
) -> Result<Response, RelayError> {
    relay(&upstream, &profile::RECIPE, body.into_contents()).await
}

pub async fn image_to_text_handler(
    upstream: Upstream,
    ValidJson(body): ValidJson<DocumentEnvelope>,
) -> Result<Response, RelayError> {
    relay(&upstream, &profile::DOCUMENT, body.into_contents()).await
}

pub async fn refine_text_handler(
    upstream: Upstream,
    ValidJson(body): ValidJson<RefineEnvelope>,
) -> Result<Response, RelayError> {
    relay(&upstream, &profile::REFINE, body.into_contents()).await
}

pub async fn fetch_news_handler(upstream: Upstream) -> Result<Response, RelayError> {
    let contents = vec![Content::user_text(prompts::NEWS_DIGEST.trim_end())];
    relay(&upstream, &profile::NEWS, contents).await
}

pub async fn generate_handler(
    upstream: Upstream,
    ValidJson(body): ValidJson<PromptEnvelope>,
) -> Result<Response, RelayError> {
    relay(&upstream, &profile::GENERATE, body.into_contents()).await
}

pub async fn create_presentation_handler(
    upstream: Upstream,
    ValidJson(body): ValidJson<PromptEnvelope>,
) -> Result<Response, RelayError> {
    relay(&upstream, &profile::PRESENTATION, body.into_contents()).await
}

/// Fallback for any method a route does not accept.
pub async fn method_not_allowed() -> RelayError {
    RelayError::MethodNotAllowed
}
