use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} for URL: {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("Failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Fetch cancelled")]
    Cancelled,

    #[error("All {attempts} attempts failed, last error: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog has no categories")]
    NoCategories,

    #[error("Invalid category name '{0}'")]
    InvalidCategory(String),

    #[error("Category '{0}' is listed more than once")]
    DuplicateCategory(String),

    #[error("Empty URL at {category}/{index}")]
    EmptyLocator { category: String, index: usize },

    #[error("Fallback URL is empty")]
    EmptyFallback,
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Failed to create directory '{}': {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Run interrupted after {completed} items")]
    Cancelled { completed: usize },
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write summary '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
