use std::fs::File;
use std::io::Write;
use std::path::Path;

use rusqlite::Connection;

use crate::domain::totals;
use crate::error::AppError;
use crate::reports;

pub fn export_register_csv(conn: &Connection, year: Option<i32>, path: &Path) -> Result<(), AppError> {
  let mut file = File::create(path)?;
  writeln!(
    file,
    "serial,memo_date,customer_name,customer_mobile,items,grand_total,advance,due,status,walk_in"
  )?;

  let rows = reports::fetch_register_rows(conn, year)?;
  for row in rows {
    let status = totals::payment_state(row.grand_total, row.advance, row.due)
      .map(|state| state.as_str())
      .unwrap_or("-");
    writeln!(
      file,
      "{},{},{},{},{},{},{},{},{},{}",
      escape_csv(&row.serial),
      escape_csv(&row.memo_date),
      escape_csv(&row.customer_name),
      escape_csv(row.customer_mobile.as_deref().unwrap_or("")),
      row.item_count,
      row.grand_total,
      row.advance,
      row.due,
      status,
      if row.is_walk_in { 1 } else { 0 }
    )?;
  }

  Ok(())
}

fn escape_csv(value: &str) -> String {
  if value.contains(',') || value.contains('"') || value.contains('\n') {
    format!("\"{}\"", value.replace('"', "\"\""))
  } else {
    value.to_string()
  }
}
