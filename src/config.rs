use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BACKOFF_SECS: u64 = 2;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_OUTPUT_DIR: &str = "images";

/// Tunables shared by the fetcher and the orchestrator
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub max_attempts: u32,
    /// Base delay; attempt N waits N times this before the next try
    pub backoff: Duration,
    pub timeout: Duration,
    pub output_dir: PathBuf,
    /// Items resolved concurrently, 1 keeps the run sequential
    pub jobs: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: Duration::from_secs(DEFAULT_BACKOFF_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            jobs: 1,
        }
    }
}
