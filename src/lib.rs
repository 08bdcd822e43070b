pub mod api;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod offline;
pub mod prompts;
pub mod router;
pub mod service;
pub mod types;

pub use api::gemini_api::GeminiClient;
pub use error::RelayError;
pub use router::{RelayState, relay_router};
