use backon::Retryable;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::Config;
use crate::error::RelayError;
use crate::service::retry::RetryPolicy;
use crate::types::gemini::GenerateContentRequest;

/// Process-wide binding of credential, endpoint and connection pool.
///
/// Holds nothing request-scoped, so one instance is shared by every
/// invocation through `Arc`.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: Url,
    model: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Build the pooled HTTP client from configuration.
    pub fn from_config(cfg: &Config, api_key: impl Into<String>) -> Result<Self, RelayError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("gemini-relay/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(cfg.request_timeout());
        if let Some(proxy_url) = cfg.proxy.as_ref() {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url.as_str())?);
        }
        let http = builder.build()?;
        Ok(Self::new(
            http,
            cfg.gemini_base_url.clone(),
            cfg.model.clone(),
            api_key,
        ))
    }

    pub fn new(
        http: reqwest::Client,
        base_url: Url,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        let model: String = model.into();
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();
        Self {
            http,
            base_url,
            model,
            api_key: api_key.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn generate_url(&self) -> Result<Url, RelayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{base}/v1beta/models/{}:generateContent",
            self.model
        ))?)
    }

    /// Call `generateContent`, repeating the whole call per `retry`.
    ///
    /// Returns the raw JSON body of the first successful attempt.
    pub async fn generate_content(
        &self,
        body: &GenerateContentRequest,
        retry: &RetryPolicy,
    ) -> Result<Value, RelayError> {
        let url = self.generate_url()?;

        (|| async { self.post_once(url.clone(), body).await })
            .retry(retry.backoff())
            .when(|e: &RelayError| retry.should_retry(e))
            .notify(|err: &RelayError, dur: Duration| {
                warn!(model = %self.model, error = %err, "Gemini call failed, retrying after {:?}", dur);
            })
            .await
    }

    async fn post_once(
        &self,
        url: Url,
        body: &GenerateContentRequest,
    ) -> Result<Value, RelayError> {
        let resp = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .inspect_err(|e| error!(model = %self.model, "Failed to send request to Gemini: {}", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!(%status, body = %body, "Gemini API error");
            return Err(RelayError::UpstreamStatus { status, body });
        }

        let bytes = resp.bytes().await?;
        let value: Value = serde_json::from_slice(&bytes).inspect_err(|e| {
            error!(
                error = %e,
                body = %String::from_utf8_lossy(&bytes),
                "Gemini response is not JSON"
            );
        })?;
        debug!(model = %self.model, "Gemini call succeeded");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::gemini::Content;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer, model: &str) -> GeminiClient {
        GeminiClient::new(
            reqwest::Client::new(),
            Url::parse(&server.uri()).unwrap(),
            model,
            "test-key",
        )
    }

    fn request() -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user_text("hi")],
            system_instruction: None,
            safety_settings: vec![],
            generation_config: None,
            tools: vec![],
        }
    }

    #[tokio::test]
    async fn sends_key_as_query_param_and_strips_models_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-test:generateContent"))
            .and(query_param("key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let value = client(&server, "models/gemini-test")
            .generate_content(&request(), &RetryPolicy::single())
            .await
            .unwrap();
        assert_eq!(value, json!({ "candidates": [] }));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad payload"))
            .expect(1)
            .mount(&server)
            .await;

        let policy = RetryPolicy::new(3, Duration::from_millis(5));
        let err = client(&server, "gemini-test")
            .generate_content(&request(), &policy)
            .await
            .unwrap_err();
        match err {
            RelayError::UpstreamStatus { status, body } => {
                assert_eq!(status.as_u16(), 400);
                assert_eq!(body, "bad payload");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server, "gemini-test")
            .generate_content(&request(), &RetryPolicy::single())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::MalformedResponse(_)));
    }
}
