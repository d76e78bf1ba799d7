pub mod audit;
pub mod commands;
pub mod db;
pub mod domain;
pub mod error;
pub mod export;
pub mod files;
pub mod models;
pub mod reports;
pub mod settings;

use std::path::PathBuf;

use db::Db;
use error::AppError;

pub struct AppState {
  pub db: Db,
  pub app_dir: PathBuf,
  pub export_base: PathBuf,
}

impl AppState {
  pub fn open() -> Result<Self, AppError> {
    let app_dir = db::resolve_app_dir()?;
    Self::open_at(app_dir)
  }

  pub fn open_at(app_dir: PathBuf) -> Result<Self, AppError> {
    let (db, export_base) = db::init_db(&app_dir)?;
    Ok(Self {
      db,
      app_dir,
      export_base,
    })
  }
}
