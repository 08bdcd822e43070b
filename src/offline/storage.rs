use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Captured response body and headers, as stored in a cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CachedResponse {
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

type Cache = BTreeMap<String, CachedResponse>;

/// Named caches, kept in creation order like the browser's `CacheStorage`.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: RwLock<Vec<(String, Cache)>>,
}

impl CacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the named cache if it does not exist yet.
    pub async fn open(&self, name: &str) {
        let mut caches = self.caches.write().await;
        if !caches.iter().any(|(n, _)| n == name) {
            caches.push((name.to_string(), Cache::new()));
        }
    }

    /// Store every entry under one write lock, so readers see all or none.
    pub async fn put_all(&self, name: &str, entries: Vec<(String, CachedResponse)>) {
        let mut caches = self.caches.write().await;
        let idx = match caches.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                caches.push((name.to_string(), Cache::new()));
                caches.len() - 1
            }
        };
        caches[idx].1.extend(entries);
    }

    pub async fn keys(&self) -> Vec<String> {
        self.caches
            .read()
            .await
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    pub async fn has(&self, name: &str) -> bool {
        self.caches.read().await.iter().any(|(n, _)| n == name)
    }

    pub async fn delete(&self, name: &str) -> bool {
        let mut caches = self.caches.write().await;
        let before = caches.len();
        caches.retain(|(n, _)| n != name);
        caches.len() != before
    }

    /// First match across all caches, oldest cache first.
    pub async fn match_url(&self, url: &str) -> Option<CachedResponse> {
        self.caches
            .read()
            .await
            .iter()
            .find_map(|(_, cache)| cache.get(url).cloned())
    }

    /// URLs stored in one cache, sorted.
    pub async fn urls(&self, name: &str) -> Vec<String> {
        self.caches
            .read()
            .await
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, cache)| cache.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resp(body: &str) -> CachedResponse {
        CachedResponse {
            status: 200,
            headers: vec![("content-type".to_string(), "text/html".to_string())],
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn keys_follow_creation_order() {
        let storage = CacheStorage::new();
        storage.open("b").await;
        storage.open("a").await;
        storage.open("b").await;
        assert_eq!(storage.keys().await, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn match_prefers_oldest_cache() {
        let storage = CacheStorage::new();
        storage.put_all("old", vec![("u".to_string(), resp("old"))]).await;
        storage.put_all("new", vec![("u".to_string(), resp("new"))]).await;
        assert_eq!(storage.match_url("u").await, Some(resp("old")));

        assert!(storage.delete("old").await);
        assert!(!storage.delete("old").await);
        assert_eq!(storage.match_url("u").await, Some(resp("new")));
        assert_eq!(storage.match_url("missing").await, None);
    }
}
