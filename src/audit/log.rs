use chrono::Utc;
use rusqlite::{params, Connection};

use crate::error::AppError;

pub fn append_activity(
  conn: &Connection,
  customer_name: &str,
  entry_date: &str,
  category: &str,
  description: &str,
  amount: f64,
  actor: Option<String>,
) -> Result<(), AppError> {
  let ts = Utc::now().to_rfc3339();
  conn.execute(
    "INSERT INTO activity_log (customer_name, entry_date, category, description, amount, actor, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      customer_name,
      entry_date,
      category,
      description,
      amount,
      actor,
      ts
    ],
  )?;
  Ok(())
}
