use std::fs;
use std::path::{Path, PathBuf};

use crate::error::AppError;

pub fn ensure_export_base(app_dir: &Path) -> Result<PathBuf, AppError> {
  let export_dir = app_dir.join("Exports");
  fs::create_dir_all(&export_dir)?;
  Ok(export_dir)
}

pub fn open_export(path: &str) -> Result<(), AppError> {
  if path.trim().is_empty() {
    return Err(AppError::new("EXPORT_PATH_EMPTY", "Export path is missing"));
  }
  if !Path::new(path).exists() {
    return Err(AppError::new("NOT_FOUND", "Export file not found"));
  }
  open::that(path).map_err(|err| AppError::new("EXPORT_OPEN", err.to_string()))?;
  Ok(())
}
