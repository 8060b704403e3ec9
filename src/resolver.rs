use crate::error::{PodvttError, Result};
use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static TRANSCRIPT_LOCATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"transcript_(\d+)\.ttml$").expect("Invalid regex"));

/// Supplies the raw document text for a transcript locator.
#[async_trait]
pub trait FileResolver: Send + Sync {
    async fn resolve(&self, locator: &str) -> Result<String>;
}

/// Resolves locators against the Podcasts transcript cache.
///
/// The catalog stores `dir/transcript_<id>.ttml`, but the cached file is
/// named `transcript_<id>.ttml-<id>.ttml`.
pub struct CacheResolver {
    root: PathBuf,
}

impl CacheResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a catalog locator to the cached file path.
    pub fn transcript_file(&self, locator: &str) -> Result<PathBuf> {
        let id = TRANSCRIPT_LOCATOR
            .captures(locator)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .ok_or_else(|| PodvttError::Locator(locator.to_string()))?;

        let file_name = format!("transcript_{id}.ttml-{id}.ttml");
        let dir = Path::new(locator).parent().unwrap_or(Path::new(""));
        let dir = dir.strip_prefix("/").unwrap_or(dir);

        Ok(self.root.join(dir).join(file_name))
    }
}

#[async_trait]
impl FileResolver for CacheResolver {
    async fn resolve(&self, locator: &str) -> Result<String> {
        let path = self.transcript_file(locator)?;

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(PodvttError::NotFound(path.display().to_string()));
        }

        debug!("Reading transcript {:?}", path);
        Ok(tokio::fs::read_to_string(&path).await?)
    }
}
