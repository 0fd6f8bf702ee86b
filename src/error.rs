// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("login against '{0}' failed; check credentials and the profile's indicators")]
    LoginFailed(String),
    #[error("walk attempted without an authenticated session")]
    NotAuthenticated,
    #[error("course root page unreachable: {0}")]
    CourseRootUnreachable(String),
    #[error("platform profile error: {0}")]
    Profile(String),
    #[error("media delegate failed: {0}")]
    MediaDelegate(String),
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("temporary file persist failed: {0}")]
    TempFilePersist(#[from] tempfile::PersistError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),
    #[error("security error: {0}")]
    Security(String),
    #[error("unexpected error: {0}")]
    Other(#[from] anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;
