use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::listing::PropertyRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not prepare export directory `{dir}`: {source}")]
    Directory { dir: PathBuf, source: std::io::Error },
    #[error("could not write listing export `{path}`: {source}")]
    Write { path: PathBuf, source: csv::Error },
}

/// Snapshot a result collection as CSV under `data_dir/filename`.
///
/// The directory is created if absent and the target file is overwritten,
/// header row included. Called at most once per tool invocation; failures
/// surface to the caller as a tagged error rather than being swallowed here.
pub fn write_csv(
    records: &[PropertyRecord],
    data_dir: &Path,
    filename: &str,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(data_dir)
        .map_err(|source| ExportError::Directory { dir: data_dir.to_path_buf(), source })?;

    let path = data_dir.join(filename);
    let mut writer = csv::Writer::from_path(&path)
        .map_err(|source| ExportError::Write { path: path.clone(), source })?;
    for record in records {
        writer
            .serialize(record)
            .map_err(|source| ExportError::Write { path: path.clone(), source })?;
    }
    writer
        .flush()
        .map_err(|source| ExportError::Write { path: path.clone(), source: source.into() })?;

    Ok(path)
}
