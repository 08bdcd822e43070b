use futures::future::try_join_all;
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use super::CacheError;
use super::manifest::CacheManifest;
use super::network::Network;
use super::storage::{CacheStorage, CachedResponse};

/// Lifecycle of one worker generation.
///
/// `New -> Installing -> Installed -> Activating -> Activated`; a failed
/// install ends in `Redundant`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    New,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

/// Cache key for a request URL; fragments never reach the server.
fn cache_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.into()
}

pub struct OfflineWorker<N> {
    scope: Url,
    manifest: CacheManifest,
    storage: Arc<CacheStorage>,
    network: N,
    state: WorkerState,
}

impl<N: Network> OfflineWorker<N> {
    pub fn new(scope: Url, manifest: CacheManifest, storage: Arc<CacheStorage>, network: N) -> Self {
        Self {
            scope,
            manifest,
            storage,
            network,
            state: WorkerState::New,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn generation(&self) -> &str {
        &self.manifest.generation
    }

    fn expect_state(&self, event: &'static str, expected: WorkerState) -> Result<(), CacheError> {
        if self.state != expected {
            return Err(CacheError::InvalidTransition {
                event,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Precache the whole manifest into this worker's generation.
    ///
    /// All or nothing: any transport failure or non-2xx response stores
    /// nothing and leaves the worker `Redundant`.
    pub async fn install(&mut self) -> Result<(), CacheError> {
        self.expect_state("install", WorkerState::New)?;
        self.state = WorkerState::Installing;

        match self.precache().await {
            Ok(count) => {
                self.state = WorkerState::Installed;
                info!(generation = %self.manifest.generation, count, "offline cache installed");
                Ok(())
            }
            Err(e) => {
                self.state = WorkerState::Redundant;
                warn!(generation = %self.manifest.generation, error = %e, "offline cache install failed");
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize, CacheError> {
        let urls = self.manifest.resolve(&self.scope)?;
        let entries = try_join_all(urls.iter().map(|url| async move {
            let resp = self.network.fetch(&Method::GET, url).await?;
            if !resp.is_ok() {
                return Err(CacheError::BadStatus {
                    url: url.to_string(),
                    status: resp.status,
                });
            }
            Ok::<_, CacheError>((cache_key(url), resp))
        }))
        .await?;

        let count = entries.len();
        self.storage.open(&self.manifest.generation).await;
        self.storage.put_all(&self.manifest.generation, entries).await;
        Ok(count)
    }

    /// Purge every cache generation other than this worker's.
    pub async fn activate(&mut self) -> Result<(), CacheError> {
        self.expect_state("activate", WorkerState::Installed)?;
        self.state = WorkerState::Activating;

        let current = self.manifest.generation.as_str();
        for name in self.storage.keys().await {
            if name != current && self.storage.delete(&name).await {
                info!(generation = %name, "deleted stale offline cache");
            }
        }

        self.state = WorkerState::Activated;
        info!(generation = %current, "offline cache activated");
        Ok(())
    }

    /// Cache first for `GET`, then network. Misses are not written back.
    pub async fn fetch(&self, method: &Method, url: &Url) -> Result<CachedResponse, CacheError> {
        if *method == Method::GET {
            if let Some(hit) = self.storage.match_url(&cache_key(url)).await {
                debug!(%url, "offline cache hit");
                return Ok(hit);
            }
        }
        debug!(%method, %url, "offline cache miss; going to network");
        self.network.fetch(method, url).await
    }
}
