use chrono::NaiveDate;

use crate::error::AppError;

pub fn parse_date(date: &str) -> Result<NaiveDate, AppError> {
  NaiveDate::parse_from_str(date, "%Y-%m-%d")
    .map_err(|_| AppError::new("INVALID_DATE", "Date must be YYYY-MM-DD"))
}

/// Required free-text field: trims and rejects empty input.
pub fn require_text(field: &str, value: &str) -> Result<String, AppError> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    Err(AppError::new("REQUIRED", format!("{field} is required")))
  } else {
    Ok(trimmed.to_string())
  }
}

/// Money fields never coerce silently: non-finite and negative values are
/// rejected instead of being treated as zero.
pub fn ensure_money(field: &str, value: f64) -> Result<f64, AppError> {
  if !value.is_finite() {
    return Err(AppError::new(
      "INVALID_AMOUNT",
      format!("{field} must be a number"),
    ));
  }
  if value < 0.0 {
    return Err(AppError::new(
      "INVALID_AMOUNT",
      format!("{field} must not be negative"),
    ));
  }
  Ok(value)
}

pub fn ensure_amount_positive(field: &str, value: f64) -> Result<f64, AppError> {
  ensure_money(field, value)?;
  if value <= 0.0 {
    Err(AppError::new(
      "INVALID_AMOUNT",
      format!("{field} must be greater than zero"),
    ))
  } else {
    Ok(value)
  }
}

/// String-to-money parsing for the CLI/JSON boundary.
pub fn parse_money(field: &str, raw: &str) -> Result<f64, AppError> {
  let value: f64 = raw
    .trim()
    .parse()
    .map_err(|_| AppError::new("INVALID_AMOUNT", format!("{field} must be a number")))?;
  ensure_money(field, value)
}

/// Optional dimension fields: absent is fine, present must be a
/// non-negative finite number (zero disables area billing).
pub fn ensure_dimension(field: &str, value: Option<f64>) -> Result<Option<f64>, AppError> {
  match value {
    None => Ok(None),
    Some(v) => ensure_money(field, v).map(Some),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_iso_dates() {
    assert!(parse_date("2025-06-30").is_ok());
    assert!(parse_date("30/06/2025").is_err());
    assert!(parse_date("2025-13-01").is_err());
  }

  #[test]
  fn required_text_trims_and_rejects_empty() {
    assert_eq!(require_text("Customer name", "  Karim ").unwrap(), "Karim");
    let err = require_text("Customer name", "   ").unwrap_err();
    assert_eq!(err.code, "REQUIRED");
  }

  #[test]
  fn money_rejects_nan_and_negative() {
    assert_eq!(ensure_money("Advance", 0.0).unwrap(), 0.0);
    assert!(ensure_money("Advance", f64::NAN).is_err());
    assert!(ensure_money("Advance", -1.0).is_err());
  }

  #[test]
  fn positive_amount_rejects_zero() {
    assert!(ensure_amount_positive("Amount", 0.0).is_err());
    assert_eq!(ensure_amount_positive("Amount", 10.0).unwrap(), 10.0);
  }

  #[test]
  fn parse_money_from_strings() {
    assert_eq!(parse_money("Advance", " 300.50 ").unwrap(), 300.5);
    assert!(parse_money("Advance", "abc").is_err());
    assert!(parse_money("Advance", "-5").is_err());
  }
}
