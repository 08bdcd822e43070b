//! Offline asset cache with a service-worker style lifecycle.
//!
//! - `manifest.rs`: the versioned list of assets precached on install
//! - `storage.rs`: named cache generations keyed by request URL
//! - `network.rs`: the fetch seam, with a `reqwest` implementation
//! - `worker.rs`: install / activate / fetch state machine

pub mod manifest;
pub mod network;
pub mod storage;
pub mod worker;

use thiserror::Error as ThisError;

pub use manifest::CacheManifest;
pub use network::{HttpNetwork, Network};
pub use storage::{CacheStorage, CachedResponse};
pub use worker::{OfflineWorker, WorkerState};

#[derive(Debug, ThisError)]
pub enum CacheError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("precache of {url} failed with status {status}")]
    BadStatus { url: String, status: u16 },

    #[error("cannot {event} while {state:?}")]
    InvalidTransition {
        event: &'static str,
        state: WorkerState,
    },
}
