use crate::error::RunError;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ensure the output root and one folder per category exist
pub fn ensure_directories<'a, I>(base_path: &Path, categories: I) -> Result<(), RunError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut dirs_to_create = vec![base_path.to_path_buf()];
    dirs_to_create.extend(categories.into_iter().map(|c| base_path.join(c)));

    // Check which directories don't exist
    let missing_dirs: Vec<PathBuf> = dirs_to_create
        .into_par_iter()
        .filter(|dir| !dir.is_dir())
        .collect();

    // create_dir_all tolerates a concurrent creator of the shared root
    missing_dirs.par_iter().try_for_each(|dir| -> Result<(), RunError> {
        fs::create_dir_all(dir).map_err(|e| RunError::CreateDir {
            path: dir.clone(),
            source: e,
        })?;
        debug!("Created directory: {}", dir.display());
        Ok(())
    })
}

/// `<base>/<category>/<index>.jpg`
pub fn destination_path(base_path: &Path, category: &str, index: usize) -> PathBuf {
    base_path.join(category).join(format!("{}.jpg", index))
}

/// Sibling path a download streams into before it is renamed onto `destination`
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_owned();
    name.push(".part");
    PathBuf::from(name)
}
