use crate::error::FetchError;
use crate::utils::files::partial_path;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

/// A download in progress, written next to its destination.
///
/// Only `commit` makes the bytes visible at the destination. Dropping the
/// value in any other state removes the temporary file, so an existing
/// destination is left untouched by a failed or cancelled attempt.
pub struct PartialFile {
    file: Option<File>,
    temp_path: PathBuf,
    destination: PathBuf,
    written: u64,
    committed: bool,
}

impl PartialFile {
    pub async fn create(destination: &Path) -> Result<Self, FetchError> {
        let temp_path = partial_path(destination);
        let file = File::create(&temp_path)
            .await
            .map_err(|e| io_error(&temp_path, e))?;

        Ok(Self {
            file: Some(file),
            temp_path,
            destination: destination.to_path_buf(),
            written: 0,
            committed: false,
        })
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), FetchError> {
        if let Some(file) = self.file.as_mut() {
            file.write_all(chunk)
                .await
                .map_err(|e| io_error(&self.temp_path, e))?;
            self.written += chunk.len() as u64;
        }
        Ok(())
    }

    /// Flush, sync and rename onto the destination. Returns the bytes written.
    pub async fn commit(mut self) -> Result<u64, FetchError> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .await
                .map_err(|e| io_error(&self.temp_path, e))?;
            file.sync_all()
                .await
                .map_err(|e| io_error(&self.temp_path, e))?;
        }

        tokio::fs::rename(&self.temp_path, &self.destination)
            .await
            .map_err(|e| io_error(&self.destination, e))?;
        self.committed = true;

        Ok(self.written)
    }
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        drop(self.file.take());
        // Absent already if create raced a cleanup; nothing else to do
        let _ = std::fs::remove_file(&self.temp_path);
    }
}

fn io_error(path: &Path, source: std::io::Error) -> FetchError {
    FetchError::Io {
        path: path.to_path_buf(),
        source,
    }
}
