//! Resilient single-resource fetching
//!
//! - `partial`: temp-file guard for streamed bodies
//! - `retry`: bounded linear backoff loop

pub mod partial;
pub mod retry;

use crate::config::FetchConfig;
use crate::error::{FetchError, RunError};
use crate::utils::http::{build_client, get_user_agent};
use async_trait::async_trait;
use futures::stream::StreamExt;
use partial::PartialFile;
use retry::retry_linear;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Materialize one remote resource at a local path.
///
/// The parent directory of `destination` must already exist. Implementations
/// return `FetchError::Cancelled` when interrupted, any other error means the
/// fetch was given up on.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    max_attempts: u32,
    backoff: Duration,
    cancel: CancellationToken,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig, cancel: CancellationToken) -> Result<Self, RunError> {
        Ok(Self {
            client: build_client(config.timeout)?,
            max_attempts: config.max_attempts,
            backoff: config.backoff,
            cancel,
        })
    }

    async fn fetch_once(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(url)
            .header("User-Agent", get_user_agent())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        let mut partial = PartialFile::create(destination).await?;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            partial.write_chunk(&chunk?).await?;
        }

        let written = partial.commit().await?;
        debug!("Saved {} bytes to {}", written, destination.display());
        Ok(written)
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> Result<u64, FetchError> {
        retry_linear(self.max_attempts, self.backoff, &self.cancel, url, |_| {
            self.fetch_once(url, destination)
        })
        .await
    }
}
