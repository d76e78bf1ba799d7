use rust_xlsxwriter::XlsxError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize, Error)]
#[error("{code}: {message}")]
pub struct AppError {
  pub code: String,
  pub message: String,
}

impl AppError {
  pub fn new(code: &str, message: impl Into<String>) -> Self {
    Self {
      code: code.to_string(),
      message: message.into(),
    }
  }
}

impl From<rusqlite::Error> for AppError {
  fn from(err: rusqlite::Error) -> Self {
    AppError::new("DB_ERROR", err.to_string())
  }
}

impl From<std::io::Error> for AppError {
  fn from(err: std::io::Error) -> Self {
    AppError::new("IO_ERROR", err.to_string())
  }
}

impl From<serde_json::Error> for AppError {
  fn from(err: serde_json::Error) -> Self {
    AppError::new("JSON_ERROR", err.to_string())
  }
}

impl From<zip::result::ZipError> for AppError {
  fn from(err: zip::result::ZipError) -> Self {
    AppError::new("ZIP_ERROR", err.to_string())
  }
}

impl From<XlsxError> for AppError {
  fn from(err: XlsxError) -> Self {
    AppError::new("EXPORT", err.to_string())
  }
}

impl<T> From<std::sync::PoisonError<T>> for AppError {
  fn from(_: std::sync::PoisonError<T>) -> Self {
    AppError::new("LOCK_ERROR", "Database lock failed")
  }
}
