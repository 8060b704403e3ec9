//! Podcast library catalog.
//!
//! Lists every episode that references a transcript, together with the
//! podcast and episode titles used to name the output files.

use crate::error::{PodvttError, Result};
use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const EPISODE_QUERY: &str = r#"
SELECT
  ZMTEPISODE.ZITUNESTITLE AS episode_title,
  ZMTEPISODE.ZENTITLEDTRANSCRIPTIDENTIFIER AS transcript_path,
  ZMTPODCAST.ZTITLE AS podcast_title
FROM ZMTEPISODE
JOIN ZMTPODCAST ON ZMTEPISODE.ZPODCASTUUID = ZMTPODCAST.ZUUID
"#;

/// One catalog row. Any column may be NULL in the library.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EpisodeRecord {
    pub podcast_title: Option<String>,
    pub episode_title: Option<String>,
    pub transcript_path: Option<String>,
}

#[async_trait]
pub trait CatalogLookup: Send + Sync {
    async fn episodes(&self) -> Result<Vec<EpisodeRecord>>;
    fn name(&self) -> &'static str;
}

/// Reads the Apple Podcasts `MTLibrary.sqlite` database, read-only.
pub struct SqliteCatalog {
    path: PathBuf,
}

impl SqliteCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn query(path: &Path) -> Result<Vec<EpisodeRecord>> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!("Opened catalog {:?}", path);

        let mut stmt = conn.prepare(EPISODE_QUERY)?;
        let rows = stmt.query_map([], |row| {
            Ok(EpisodeRecord {
                episode_title: row.get(0)?,
                transcript_path: row.get(1)?,
                podcast_title: row.get(2)?,
            })
        })?;

        let episodes = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(episodes)
    }
}

#[async_trait]
impl CatalogLookup for SqliteCatalog {
    async fn episodes(&self) -> Result<Vec<EpisodeRecord>> {
        if !self.path.exists() {
            return Err(PodvttError::NotFound(self.path.display().to_string()));
        }

        let path = self.path.clone();
        let episodes = tokio::task::spawn_blocking(move || Self::query(&path))
            .await
            .map_err(|e| PodvttError::Io(std::io::Error::other(format!("Catalog task failed: {}", e))))??;

        info!("Catalog lists {} episodes", episodes.len());
        Ok(episodes)
    }

    fn name(&self) -> &'static str {
        "Podcasts library"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_library(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE ZMTPODCAST (ZUUID TEXT, ZTITLE TEXT);
            CREATE TABLE ZMTEPISODE (
                ZITUNESTITLE TEXT,
                ZENTITLEDTRANSCRIPTIDENTIFIER TEXT,
                ZPODCASTUUID TEXT
            );
            INSERT INTO ZMTPODCAST VALUES ('p1', 'Daily News');
            INSERT INTO ZMTEPISODE VALUES ('Monday', 'a/b/transcript_1.ttml', 'p1');
            INSERT INTO ZMTEPISODE VALUES (NULL, NULL, 'p1');
            INSERT INTO ZMTEPISODE VALUES ('Orphan', 'x/transcript_9.ttml', 'missing');
            "#,
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_sqlite_catalog_joins_podcasts() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("MTLibrary.sqlite");
        create_library(&db);

        let catalog = SqliteCatalog::new(&db);
        let mut episodes = catalog.episodes().await.unwrap();
        episodes.sort_by(|a, b| a.episode_title.cmp(&b.episode_title));

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].episode_title, None);
        assert_eq!(episodes[0].transcript_path, None);
        assert_eq!(
            episodes[1],
            EpisodeRecord {
                podcast_title: Some("Daily News".to_string()),
                episode_title: Some("Monday".to_string()),
                transcript_path: Some("a/b/transcript_1.ttml".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_database_is_not_found() {
        let catalog = SqliteCatalog::new("/nonexistent/MTLibrary.sqlite");
        assert!(matches!(
            catalog.episodes().await,
            Err(PodvttError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_wrong_schema_is_catalog_error() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("empty.sqlite");
        Connection::open(&db)
            .unwrap()
            .execute_batch("CREATE TABLE other (x INTEGER);")
            .unwrap();

        let catalog = SqliteCatalog::new(&db);
        assert!(matches!(
            catalog.episodes().await,
            Err(PodvttError::Catalog(_))
        ));
    }
}
