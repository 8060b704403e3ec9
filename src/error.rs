use thiserror::Error;

#[derive(Error, Debug)]
pub enum PodvttError {
    #[error("Malformed TTML: {0}")]
    Parse(String),

    #[error("Unexpected TTML structure: {0}")]
    Structure(String),

    #[error("Unrecognized time expression: {0:?}")]
    TimeFormat(String),

    #[error("Transcript not found: {0}")]
    NotFound(String),

    #[error("Invalid transcript locator: {0}")]
    Locator(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] rusqlite::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PodvttError>;
