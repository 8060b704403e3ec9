use crate::catalog::EpisodeRecord;
use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static UNSAFE_FILE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1F]"#).expect("Invalid regex"));

const UNKNOWN_PODCAST: &str = "UnknownPodcast";
const UNKNOWN_EPISODE: &str = "UnknownEpisode";

/// Remove characters that are not allowed in file names, then trim.
pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_FILE_CHARS.replace_all(name, "").trim().to_string()
}

/// Where a converted transcript goes: a podcast folder and an episode file stem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputTarget {
    pub podcast: String,
    pub episode: String,
}

impl OutputTarget {
    pub fn new(podcast: &str, episode: &str) -> Self {
        Self {
            podcast: sanitize_or(podcast, UNKNOWN_PODCAST),
            episode: sanitize_or(episode, UNKNOWN_EPISODE),
        }
    }

    pub fn from_record(record: &EpisodeRecord) -> Self {
        Self::new(
            record.podcast_title.as_deref().unwrap_or_default(),
            record.episode_title.as_deref().unwrap_or_default(),
        )
    }
}

fn sanitize_or(name: &str, fallback: &str) -> String {
    let name = sanitize_file_name(name);
    if name.is_empty() {
        fallback.to_string()
    } else {
        name
    }
}

/// Receives finished documents.
#[async_trait]
pub trait OutputSink: Send + Sync {
    /// Store `contents` for `target` with the given extension and return its location.
    async fn write(&self, target: &OutputTarget, extension: &str, contents: &str) -> Result<PathBuf>;
}

/// Writes `<root>/<podcast>/<episode>.<ext>`, creating folders as needed.
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, target: &OutputTarget, extension: &str) -> PathBuf {
        self.root
            .join(&target.podcast)
            .join(format!("{}.{}", target.episode, extension))
    }
}

#[async_trait]
impl OutputSink for DirectorySink {
    async fn write(&self, target: &OutputTarget, extension: &str, contents: &str) -> Result<PathBuf> {
        let path = self.path_for(target, extension);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, contents).await?;
        debug!("Wrote {:?}", path);
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("A/B: C?"), "AB C");
        assert_eq!(sanitize_file_name("  <Title>  "), "Title");
        assert_eq!(sanitize_file_name("tab\there"), "tabhere");
        assert_eq!(sanitize_file_name(r#"quote"pipe|star*back\"#), "quotepipestarback");
        assert_eq!(sanitize_file_name("Ünïcode – fine"), "Ünïcode – fine");
    }

    #[test]
    fn test_target_fallback_names() {
        let target = OutputTarget::from_record(&EpisodeRecord::default());
        assert_eq!(target.podcast, "UnknownPodcast");
        assert_eq!(target.episode, "UnknownEpisode");

        let target = OutputTarget::new("???", "Ep. 1");
        assert_eq!(target.podcast, "UnknownPodcast");
        assert_eq!(target.episode, "Ep. 1");
    }

    #[tokio::test]
    async fn test_directory_sink_creates_podcast_folder() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());
        let target = OutputTarget::new("My Show", "Pilot");

        let path = sink.write(&target, "vtt", "WEBVTT\n").await.unwrap();

        assert_eq!(path, dir.path().join("My Show").join("Pilot.vtt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "WEBVTT\n");
    }

    #[tokio::test]
    async fn test_directory_sink_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());
        let target = OutputTarget::new("Show", "Ep");

        sink.write(&target, "vtt", "old").await.unwrap();
        let path = sink.write(&target, "vtt", "new").await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "new");
    }
}
