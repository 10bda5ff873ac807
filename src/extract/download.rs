use crate::error::ClientResult;
use crate::extract::types::ExportFormat;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Writes an export into `dir` under the format's fixed file name, replacing
/// any earlier download of the same format.
pub fn save_download(dir: &Path, format: ExportFormat, contents: &[u8]) -> ClientResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format.file_name());
    fs::write(&path, contents)?;
    info!("Saved {} export to {}", format.label(), path.display());
    Ok(path)
}
