use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use std::time::Duration;
use url::Url;

pub const GEMINI_DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub listen_addr: String,
    pub loglevel: String,
    /// Upstream credential. Absence is reported per request, not at startup.
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: Url,
    pub model: String,
    pub proxy: Option<Url>,
    pub request_timeout_secs: u64,
    pub retry_max_attempts: usize,
    pub retry_delay_ms: u64,
    pub body_limit_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
            gemini_api_key: None,
            gemini_base_url: Url::parse(GEMINI_DEFAULT_BASE_URL)
                .expect("default Gemini base URL is valid"),
            model: "gemini-2.5-flash".to_string(),
            proxy: None,
            request_timeout_secs: 60,
            retry_max_attempts: 3,
            retry_delay_ms: 1000,
            body_limit_bytes: 20 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Defaults, then `RELAY_*` variables, then the bare `GEMINI_API_KEY`.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("RELAY_"))
            .merge(Env::raw().only(&["GEMINI_API_KEY"]))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    /// The key, if present and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: invalid relay configuration"));
