use crate::error::{PodvttError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Apple Podcasts group container, relative to the home directory.
const PODCASTS_CONTAINER: &str = "Library/Group Containers/243LU875E5.groups.com.apple.podcasts";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Podcast library SQLite catalog.
    pub library_db: Option<PathBuf>,
    /// Root of the cached transcript files.
    pub ttml_root: Option<PathBuf>,
    /// Where per-podcast folders are created.
    pub output_dir: Option<PathBuf>,
    pub concurrency: usize,
    /// Reveal the output folder in the file browser when done.
    pub open_output: bool,
    pub keep_empty_cues: bool,
    /// Also write the raw TTML next to each VTT.
    pub copy_ttml: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_db: None,
            ttml_root: None,
            output_dir: None,
            concurrency: 4,
            open_output: true,
            keep_empty_cues: true,
            copy_ttml: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                if let Ok(file_config) = toml::from_str::<Config>(&contents) {
                    config = file_config;
                }
            }
        }

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Override fields from environment-style variables.
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = var("PODVTT_LIBRARY_DB") {
            self.library_db = Some(PathBuf::from(path));
        }
        if let Some(path) = var("PODVTT_TTML_ROOT") {
            self.ttml_root = Some(PathBuf::from(path));
        }
        if let Some(path) = var("PODVTT_OUTPUT_DIR") {
            self.output_dir = Some(PathBuf::from(path));
        }
        if let Some(concurrency) = var("PODVTT_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(PodvttError::Config(
                "Concurrency must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn library_db_path(&self) -> Result<PathBuf> {
        resolve_or_home(
            &self.library_db,
            &format!("{}/Documents/MTLibrary.sqlite", PODCASTS_CONTAINER),
        )
    }

    pub fn ttml_root_path(&self) -> Result<PathBuf> {
        resolve_or_home(
            &self.ttml_root,
            &format!("{}/Library/Cache/Assets/TTML", PODCASTS_CONTAINER),
        )
    }

    pub fn output_dir_path(&self) -> Result<PathBuf> {
        resolve_or_home(&self.output_dir, "ExtractedTranscripts")
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("podvtt").join("config.toml"))
    }
}

fn resolve_or_home(explicit: &Option<PathBuf>, relative: &str) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.clone());
    }
    dirs::home_dir()
        .map(|home| home.join(relative))
        .ok_or_else(|| PodvttError::Config("Could not determine home directory".to_string()))
}
