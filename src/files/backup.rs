use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use chrono::Utc;
use walkdir::WalkDir;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::AppError;

pub fn create_backup(
  app_dir: &Path,
  db_path: &Path,
  export_base: &Path,
  include_exports: bool,
  output_path: Option<String>,
) -> Result<String, AppError> {
  let backup_dir = app_dir.join("Backups");
  fs::create_dir_all(&backup_dir)?;

  let filename = output_path.unwrap_or_else(|| {
    let stamp = Utc::now().format("%Y%m%d_%H%M");
    backup_dir
      .join(format!("backup_{stamp}.zip"))
      .to_string_lossy()
      .to_string()
  });

  if let Some(parent) = Path::new(&filename).parent() {
    fs::create_dir_all(parent)?;
  }

  let file = File::create(&filename)?;
  let mut zip = ZipWriter::new(file);
  let options = FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

  append_file(&mut zip, "db.sqlite".to_string(), db_path, options)?;

  if include_exports && export_base.exists() {
    for entry in WalkDir::new(export_base).into_iter().filter_map(Result::ok) {
      if entry.file_type().is_file() {
        let path = entry.path();
        let rel = path.strip_prefix(export_base).unwrap_or(path);
        let archive_name = Path::new("exports").join(rel).to_string_lossy().replace('\\', "/");
        append_file(&mut zip, archive_name, path, options)?;
      }
    }
  }

  zip.finish()?;
  Ok(filename)
}

pub fn restore_backup(archive_path: &str, db_path: &Path, export_base: &Path) -> Result<(), AppError> {
  let file = File::open(archive_path)?;
  let mut archive = ZipArchive::new(file)?;

  let temp_dir = std::env::temp_dir().join(format!("master_press_restore_{}", Utc::now().timestamp()));
  fs::create_dir_all(&temp_dir)?;

  for i in 0..archive.len() {
    let mut file = archive.by_index(i)?;
    let outpath = match file.enclosed_name() {
      Some(rel) => temp_dir.join(rel),
      None => continue,
    };

    if file.name().ends_with('/') {
      fs::create_dir_all(&outpath)?;
    } else {
      if let Some(parent) = outpath.parent() {
        fs::create_dir_all(parent)?;
      }
      let mut outfile = File::create(&outpath)?;
      std::io::copy(&mut file, &mut outfile)?;
    }
  }

  let restored_db = temp_dir.join("db.sqlite");
  if !restored_db.exists() {
    return Err(AppError::new("BACKUP_INVALID", "Archive does not contain db.sqlite"));
  }

  if db_path.exists() {
    let backup_path = db_path.with_extension("bak");
    fs::copy(db_path, backup_path)?;
  }
  fs::copy(restored_db, db_path)?;

  let restored_exports = temp_dir.join("exports");
  if restored_exports.exists() {
    fs::create_dir_all(export_base)?;
    for entry in WalkDir::new(&restored_exports).into_iter().filter_map(Result::ok) {
      if entry.file_type().is_file() {
        let rel = entry.path().strip_prefix(&restored_exports).unwrap_or(entry.path());
        let target = export_base.join(rel);
        if let Some(parent) = target.parent() {
          fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), target)?;
      }
    }
  }

  Ok(())
}

fn append_file(
  zip: &mut ZipWriter<File>,
  name: String,
  path: &Path,
  options: FileOptions<'_, ()>,
) -> Result<(), AppError> {
  zip.start_file(name, options)?;
  let mut source = File::open(path)?;
  let mut data = Vec::new();
  source.read_to_end(&mut data)?;
  zip.write_all(&data)?;
  Ok(())
}
