use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{MethodRouter, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::api::gemini_api::GeminiClient;
use crate::config::Config;
use crate::error::RelayError;
use crate::handlers::relay::{
    chat_handler, create_presentation_handler, fetch_news_handler, generate_handler,
    generate_ideas_handler, generate_recipe_handler, image_to_text_handler, method_not_allowed,
    refine_text_handler,
};
use crate::service::retry::RetryPolicy;

#[derive(Clone)]
pub struct RelayState {
    /// `None` when no API key is configured; every relay route then fails.
    pub gemini: Option<Arc<GeminiClient>>,
    pub retry: RetryPolicy,
    pub body_limit: usize,
}

impl RelayState {
    pub fn new(gemini: Option<Arc<GeminiClient>>, retry: RetryPolicy, body_limit: usize) -> Self {
        Self {
            gemini,
            retry,
            body_limit,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, RelayError> {
        let gemini = match cfg.api_key() {
            Some(key) => Some(Arc::new(GeminiClient::from_config(cfg, key)?)),
            None => {
                warn!("GEMINI_API_KEY is not set; relay routes will answer 500");
                None
            }
        };
        let retry = RetryPolicy::new(cfg.retry_max_attempts, cfg.retry_delay());
        Ok(Self::new(gemini, retry, cfg.body_limit_bytes))
    }
}

fn only(route: MethodRouter<RelayState>) -> MethodRouter<RelayState> {
    route.fallback(method_not_allowed)
}

pub fn relay_router(state: RelayState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route("/api/chat", only(post(chat_handler)))
        .route("/api/generate-ideas", only(post(generate_ideas_handler)))
        .route("/api/generate-recipe", only(post(generate_recipe_handler)))
        .route("/api/image-to-text", only(post(image_to_text_handler)))
        .route("/api/refine-text", only(post(refine_text_handler)))
        .route("/api/fetch-news", only(get(fetch_news_handler)))
        .route("/api/generate", only(post(generate_handler)))
        .route(
            "/api/create-presentation",
            only(post(create_presentation_handler)),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
