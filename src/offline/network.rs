use reqwest::Method;
use std::future::Future;
use url::Url;

use super::CacheError;
use super::storage::CachedResponse;

/// Where cache misses and precache requests go.
pub trait Network: Send + Sync {
    fn fetch(
        &self,
        method: &Method,
        url: &Url,
    ) -> impl Future<Output = Result<CachedResponse, CacheError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Network for HttpNetwork {
    async fn fetch(&self, method: &Method, url: &Url) -> Result<CachedResponse, CacheError> {
        let resp = self.client.request(method.clone(), url.clone()).send().await?;
        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = resp.bytes().await?.to_vec();
        Ok(CachedResponse {
            status,
            headers,
            body,
        })
    }
}
