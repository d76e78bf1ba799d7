use std::collections::HashSet;

use rusqlite::{params, Connection};

use crate::domain::balance;
use crate::domain::totals::{payment_state, PaymentState};
use crate::error::AppError;
use crate::models::{CustomerOverview, DashboardStats, InvoiceSummary};

pub fn dashboard_stats(conn: &Connection) -> Result<DashboardStats, AppError> {
  let mut stmt = conn.prepare("SELECT customer_name, grand_total, advance, due FROM invoices")?;
  let rows = stmt.query_map([], |row| {
    Ok((
      row.get::<_, String>(0)?,
      row.get::<_, f64>(1)?,
      row.get::<_, f64>(2)?,
      row.get::<_, f64>(3)?,
    ))
  })?;

  let mut stats = DashboardStats {
    invoice_count: 0,
    paid_count: 0,
    partial_count: 0,
    unpaid_count: 0,
    total_revenue: 0.0,
    pending_revenue: 0.0,
    customer_count: 0,
  };
  let mut invoiced_names: HashSet<String> = HashSet::new();

  for row in rows {
    let (customer_name, grand_total, advance, due) = row?;
    stats.invoice_count += 1;
    invoiced_names.insert(balance::normalize_name(&customer_name));

    match payment_state(grand_total, advance, due) {
      Some(PaymentState::Paid) => {
        stats.paid_count += 1;
        stats.total_revenue += grand_total;
      }
      Some(PaymentState::Partial) => {
        stats.partial_count += 1;
        stats.total_revenue += advance;
        stats.pending_revenue += due;
      }
      Some(PaymentState::Unpaid) => {
        stats.unpaid_count += 1;
        stats.pending_revenue += due;
      }
      None => {}
    }
  }

  let saved_customers: i64 = conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
  stats.customer_count = (invoiced_names.len() as i64).max(saved_customers);

  Ok(stats)
}

pub fn fetch_register_rows(conn: &Connection, year: Option<i32>) -> Result<Vec<InvoiceSummary>, AppError> {
  let base = "SELECT id, serial, customer_name, customer_mobile, memo_date, grand_total, advance, due, is_paid, is_walk_in,
        (SELECT COUNT(*) FROM invoice_items WHERE invoice_id = invoices.id)
     FROM invoices";

  let mut data = Vec::new();
  if let Some(year) = year {
    let sql = format!("{base} WHERE strftime('%Y', memo_date) = ?1 ORDER BY CAST(serial AS INTEGER)");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![format!("{year:04}")], map_summary_row)?;
    for row in rows {
      data.push(row?);
    }
  } else {
    let sql = format!("{base} ORDER BY CAST(serial AS INTEGER)");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_summary_row)?;
    for row in rows {
      data.push(row?);
    }
  }

  Ok(data)
}

pub fn customer_rollups(conn: &Connection) -> Result<Vec<CustomerOverview>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT c.id, c.name, c.address, c.mobile, c.opening_balance,
        COALESCE(i.invoice_count, 0), COALESCE(i.total_billed, 0), COALESCE(i.total_due, 0)
     FROM customers c
     LEFT JOIN (
       SELECT LOWER(TRIM(customer_name)) AS norm,
           COUNT(*) AS invoice_count,
           COALESCE(SUM(grand_total), 0) AS total_billed,
           COALESCE(SUM(due), 0) AS total_due
       FROM invoices
       GROUP BY LOWER(TRIM(customer_name))
     ) i ON i.norm = LOWER(TRIM(c.name))
     ORDER BY c.name COLLATE NOCASE",
  )?;
  let rows = stmt.query_map([], map_overview_row)?;
  Ok(rows.filter_map(Result::ok).collect())
}

pub fn map_overview_row(row: &rusqlite::Row) -> Result<CustomerOverview, rusqlite::Error> {
  Ok(CustomerOverview {
    id: row.get(0)?,
    name: row.get(1)?,
    address: row.get(2)?,
    mobile: row.get(3)?,
    opening_balance: row.get(4)?,
    invoice_count: row.get(5)?,
    total_billed: row.get(6)?,
    total_due: row.get(7)?,
  })
}

pub fn map_summary_row(row: &rusqlite::Row) -> Result<InvoiceSummary, rusqlite::Error> {
  Ok(InvoiceSummary {
    id: row.get(0)?,
    serial: row.get(1)?,
    customer_name: row.get(2)?,
    customer_mobile: row.get(3)?,
    memo_date: row.get(4)?,
    grand_total: row.get(5)?,
    advance: row.get(6)?,
    due: row.get(7)?,
    is_paid: row.get::<_, i64>(8)? != 0,
    is_walk_in: row.get::<_, i64>(9)? != 0,
    item_count: row.get(10)?,
  })
}
