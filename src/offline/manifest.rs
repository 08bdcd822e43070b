use url::Url;

use super::CacheError;

pub const DEFAULT_GENERATION: &str = "studio-cache-v1";

pub const DEFAULT_ASSETS: &[&str] = &[
    "./",
    "index.html",
    "blog.html",
    "voicetype.html",
    "imagetotext.html",
    "textsummarizer.html",
    "todolist.html",
    "qrcodegenerator.html",
    "passwordgenerator.html",
    "presentationideagenerator.html",
    "fontconverter.html",
    "socialpostgenerator.html",
    "resume-builder.html",
    "privacy.html",
    "logo.jpg",
    "logo-192.png",
    "logo-512.png",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css",
];

/// One cache generation: its name and the assets precached into it.
///
/// Bumping `generation` is what retires the previous cache on activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheManifest {
    pub generation: String,
    pub assets: Vec<String>,
}

impl Default for CacheManifest {
    fn default() -> Self {
        Self::new(
            DEFAULT_GENERATION,
            DEFAULT_ASSETS.iter().map(|s| s.to_string()),
        )
    }
}

impl CacheManifest {
    pub fn new(generation: impl Into<String>, assets: impl IntoIterator<Item = String>) -> Self {
        Self {
            generation: generation.into(),
            assets: assets.into_iter().collect(),
        }
    }

    /// Resolve relative entries against the worker scope; absolute URLs pass through.
    pub fn resolve(&self, scope: &Url) -> Result<Vec<Url>, CacheError> {
        let mut urls: Vec<Url> = Vec::with_capacity(self.assets.len());
        for asset in &self.assets {
            let url = scope.join(asset)?;
            if !urls.contains(&url) {
                urls.push(url);
            }
        }
        Ok(urls)
    }
}
