use std::fs;
use std::path::PathBuf;

use chrono::{Datelike, Utc};
use rusqlite::{params, Connection};

use crate::audit::log::append_activity;
use crate::db;
use crate::domain::{balance, serial, totals, validation};
use crate::error::AppError;
use crate::export::{csv, excel};
use crate::files::{backup, exports};
use crate::models::*;
use crate::reports;
use crate::settings;
use crate::AppState;

pub fn get_settings(state: &AppState) -> Result<Settings, AppError> {
  db::with_conn(&state.db, |conn| settings::get_settings(conn))
}

pub fn update_settings(state: &AppState, settings_input: Settings, actor: Option<String>) -> Result<Settings, AppError> {
  if settings_input.serial_floor < 0 {
    return Err(AppError::new("INVALID_FLOOR", "Serial floor must not be negative"));
  }

  db::with_conn(&state.db, |conn| {
    settings::update_settings(conn, &settings_input)?;
    log_activity(conn, "", &today(), "Settings", "Shop profile updated", 0.0, actor);
    Ok(settings_input)
  })
}

pub fn next_invoice_serial(state: &AppState) -> Result<String, AppError> {
  db::with_conn(&state.db, |conn| {
    let floor = settings::get_settings(conn)?.serial_floor;
    derive_next_serial(conn, floor)
  })
}

pub fn save_invoice(state: &AppState, input: InvoiceInput, actor: Option<String>) -> Result<InvoiceRecord, AppError> {
  let customer_name = validation::require_text("Customer name", &input.customer_name)?;
  validation::parse_date(&input.memo_date)?;
  let advance = validation::ensure_money("Advance", input.advance)?;
  for item in &input.items {
    validation::require_text("Item details", &item.details)?;
    validation::ensure_money("Quantity", item.quantity)?;
    validation::ensure_money("Rate", item.rate)?;
    validation::ensure_dimension("Length", item.length_ft)?;
    validation::ensure_dimension("Width", item.width_ft)?;
    if let Some(total) = item.total {
      validation::ensure_money("Item total", total)?;
    }
  }

  let totals = totals::recompute_invoice(&input.items, advance);

  db::with_conn(&state.db, |conn| {
    let tx = conn.transaction()?;

    // Serial is derived inside the write lock; a caller-provided serial
    // upserts the existing row.
    let serial = match input.serial.as_deref().map(str::trim) {
      Some(value) if !value.is_empty() => value.to_string(),
      _ => {
        let floor = settings::get_settings(&tx)?.serial_floor;
        derive_next_serial(&tx, floor)?
      }
    };

    let now = Utc::now().to_rfc3339();
    tx.execute(
      "INSERT INTO invoices (serial, customer_name, customer_address, customer_mobile, memo_date, grand_total, advance, due, is_paid, is_walk_in, in_words, created_at, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
       ON CONFLICT(serial) DO UPDATE SET
         customer_name = excluded.customer_name,
         customer_address = excluded.customer_address,
         customer_mobile = excluded.customer_mobile,
         memo_date = excluded.memo_date,
         grand_total = excluded.grand_total,
         advance = excluded.advance,
         due = excluded.due,
         is_paid = excluded.is_paid,
         is_walk_in = excluded.is_walk_in,
         in_words = excluded.in_words,
         updated_at = excluded.updated_at",
      params![
        serial,
        customer_name,
        input.customer_address,
        input.customer_mobile,
        input.memo_date,
        totals.grand_total,
        advance,
        totals.due,
        if totals.is_paid { 1 } else { 0 },
        if input.is_walk_in { 1 } else { 0 },
        totals.in_words,
        now
      ],
    )?;

    let invoice_id: i64 = tx.query_row(
      "SELECT id FROM invoices WHERE serial = ?1",
      params![serial],
      |row| row.get(0),
    )?;

    tx.execute("DELETE FROM invoice_items WHERE invoice_id = ?1", params![invoice_id])?;
    {
      let mut item_stmt = tx.prepare(
        "INSERT INTO invoice_items (invoice_id, position, details, length_ft, width_ft, quantity, rate, total) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
      )?;
      for (position, (item, total)) in input.items.iter().zip(totals.item_totals.iter()).enumerate() {
        item_stmt.execute(params![
          invoice_id,
          position as i64,
          item.details.trim(),
          item.length_ft,
          item.width_ft,
          item.quantity,
          item.rate,
          *total
        ])?;
      }
    }

    if !input.is_walk_in {
      tx.execute(
        "INSERT INTO customers (name, address, mobile, opening_balance, created_at, updated_at)
         VALUES (?1, ?2, ?3, 0, ?4, ?4)
         ON CONFLICT(name) DO UPDATE SET
           address = excluded.address,
           mobile = excluded.mobile,
           updated_at = excluded.updated_at",
        params![customer_name, input.customer_address, input.customer_mobile, now],
      )?;
    }

    log_activity(
      &tx,
      &customer_name,
      &input.memo_date,
      "Invoice",
      &format!("Saved memo #{serial}"),
      totals.grand_total,
      actor,
    );

    tx.commit()?;
    fetch_invoice_by_serial(conn, &serial)
  })
}

pub fn get_invoice(state: &AppState, serial: String) -> Result<InvoiceRecord, AppError> {
  db::with_conn(&state.db, |conn| fetch_invoice_by_serial(conn, serial.trim()))
}

pub fn list_invoices(state: &AppState, filter: InvoiceFilter) -> Result<Paginated<InvoiceSummary>, AppError> {
  let search = filter.search.clone().unwrap_or_default();
  let search_trimmed = search.trim();
  let has_search = !search_trimmed.is_empty();
  let page = if filter.page < 1 { 1 } else { filter.page };
  let page_size = if filter.page_size < 1 { 50 } else { filter.page_size };
  let offset = (page - 1) * page_size;

  let status = filter.status.as_deref().map(str::to_ascii_lowercase);
  let status_clause = match status.as_deref() {
    Some("paid") => " AND is_paid = 1",
    Some("unpaid") => " AND is_paid = 0",
    _ => "",
  };

  db::with_conn(&state.db, |conn| {
    let total: i64 = if has_search {
      let like = format!("%{}%", search_trimmed);
      conn.query_row(
        &format!(
          "SELECT COUNT(*) FROM invoices
           WHERE (serial LIKE ?1 OR customer_name LIKE ?1 OR customer_mobile LIKE ?1 OR memo_date LIKE ?1){status_clause}"
        ),
        params![like],
        |row| row.get(0),
      )?
    } else {
      conn.query_row(
        &format!("SELECT COUNT(*) FROM invoices WHERE 1=1{status_clause}"),
        [],
        |row| row.get(0),
      )?
    };

    let mut items = Vec::new();
    if has_search {
      let like = format!("%{}%", search_trimmed);
      let mut stmt = conn.prepare(&format!(
        "SELECT id, serial, customer_name, customer_mobile, memo_date, grand_total, advance, due, is_paid, is_walk_in,
            (SELECT COUNT(*) FROM invoice_items WHERE invoice_id = invoices.id)
         FROM invoices
         WHERE (serial LIKE ?1 OR customer_name LIKE ?1 OR customer_mobile LIKE ?1 OR memo_date LIKE ?1){status_clause}
         ORDER BY CAST(serial AS INTEGER) DESC
         LIMIT ?2 OFFSET ?3"
      ))?;
      let rows = stmt.query_map(params![like, page_size, offset], reports::map_summary_row)?;
      for row in rows {
        items.push(row?);
      }
    } else {
      let mut stmt = conn.prepare(&format!(
        "SELECT id, serial, customer_name, customer_mobile, memo_date, grand_total, advance, due, is_paid, is_walk_in,
            (SELECT COUNT(*) FROM invoice_items WHERE invoice_id = invoices.id)
         FROM invoices
         WHERE 1=1{status_clause}
         ORDER BY CAST(serial AS INTEGER) DESC
         LIMIT ?1 OFFSET ?2"
      ))?;
      let rows = stmt.query_map(params![page_size, offset], reports::map_summary_row)?;
      for row in rows {
        items.push(row?);
      }
    }

    Ok(Paginated { total, items })
  })
}

pub fn delete_invoice(state: &AppState, serial: String, actor: Option<String>) -> Result<i64, AppError> {
  let serial = validation::require_text("Invoice serial", &serial)?;

  db::with_conn(&state.db, |conn| {
    let (invoice_id, customer_name, grand_total): (i64, String, f64) = conn
      .query_row(
        "SELECT id, customer_name, grand_total FROM invoices WHERE serial = ?1",
        params![serial],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
      )
      .map_err(|_| AppError::new("NOT_FOUND", "Invoice not found"))?;

    let tx = conn.transaction()?;
    let mut deleted = 0_i64;
    deleted += tx.execute("DELETE FROM invoice_items WHERE invoice_id = ?1", params![invoice_id])? as i64;
    deleted += tx.execute("DELETE FROM invoices WHERE id = ?1", params![invoice_id])? as i64;
    log_activity(
      &tx,
      &customer_name,
      &today(),
      "Invoice",
      &format!("Deleted memo #{serial}"),
      grand_total,
      actor,
    );
    tx.commit()?;
    Ok(deleted)
  })
}

pub fn update_invoice_payment(state: &AppState, serial: String, advance: f64, actor: Option<String>) -> Result<InvoiceRecord, AppError> {
  let serial = validation::require_text("Invoice serial", &serial)?;
  validation::ensure_money("Advance", advance)?;

  db::with_conn(&state.db, |conn| {
    let (grand_total, customer_name): (f64, String) = conn
      .query_row(
        "SELECT grand_total, customer_name FROM invoices WHERE serial = ?1",
        params![serial],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .map_err(|_| AppError::new("NOT_FOUND", "Invoice not found"))?;

    let (due, is_paid) = totals::settle_payment(grand_total, advance);
    let now = Utc::now().to_rfc3339();
    conn.execute(
      "UPDATE invoices SET advance = ?1, due = ?2, is_paid = ?3, updated_at = ?4 WHERE serial = ?5",
      params![advance, due, if is_paid { 1 } else { 0 }, now, serial],
    )?;

    log_activity(
      conn,
      &customer_name,
      &today(),
      "Payment",
      &format!("Advance set to {advance:.2} for memo #{serial}"),
      advance,
      actor,
    );
    fetch_invoice_by_serial(conn, &serial)
  })
}

pub fn mark_invoice_paid(state: &AppState, serial: String, actor: Option<String>) -> Result<InvoiceRecord, AppError> {
  let serial = validation::require_text("Invoice serial", &serial)?;

  db::with_conn(&state.db, |conn| {
    let (grand_total, customer_name): (f64, String) = conn
      .query_row(
        "SELECT grand_total, customer_name FROM invoices WHERE serial = ?1",
        params![serial],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .map_err(|_| AppError::new("NOT_FOUND", "Invoice not found"))?;

    let (due, is_paid) = totals::settle_payment(grand_total, grand_total);
    let now = Utc::now().to_rfc3339();
    conn.execute(
      "UPDATE invoices SET advance = ?1, due = ?2, is_paid = ?3, updated_at = ?4 WHERE serial = ?5",
      params![grand_total, due, if is_paid { 1 } else { 0 }, now, serial],
    )?;

    log_activity(
      conn,
      &customer_name,
      &today(),
      "Payment",
      &format!("Marked memo #{serial} paid"),
      grand_total,
      actor,
    );
    fetch_invoice_by_serial(conn, &serial)
  })
}

pub fn save_customer(state: &AppState, input: CustomerInput, actor: Option<String>) -> Result<Customer, AppError> {
  let name = validation::require_text("Customer name", &input.name)?;
  if let Some(value) = input.opening_balance {
    validation::ensure_money("Opening balance", value)?;
  }

  db::with_conn(&state.db, |conn| {
    let now = Utc::now().to_rfc3339();
    conn.execute(
      "INSERT INTO customers (name, address, mobile, opening_balance, created_at, updated_at)
       VALUES (?1, ?2, ?3, COALESCE(?4, 0), ?5, ?5)
       ON CONFLICT(name) DO UPDATE SET
         address = excluded.address,
         mobile = excluded.mobile,
         opening_balance = COALESCE(?4, opening_balance),
         updated_at = excluded.updated_at",
      params![name, input.address, input.mobile, input.opening_balance, now],
    )?;
    log_activity(conn, &name, &today(), "Customer", "Customer profile saved", 0.0, actor);
    fetch_customer_by_name(conn, &name)
  })
}

pub fn list_customers(state: &AppState, search: Option<String>) -> Result<Vec<CustomerOverview>, AppError> {
  let search = search.unwrap_or_default();
  let search_trimmed = search.trim().to_string();

  db::with_conn(&state.db, |conn| {
    if search_trimmed.is_empty() {
      return reports::customer_rollups(conn);
    }

    let like = format!("%{}%", search_trimmed);
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
       WHERE c.name LIKE ?1 OR c.mobile LIKE ?1 OR c.address LIKE ?1
       ORDER BY c.name COLLATE NOCASE",
    )?;
    let rows = stmt.query_map(params![like], reports::map_overview_row)?;
    let mut items = Vec::new();
    for row in rows {
      items.push(row?);
    }
    Ok(items)
  })
}

pub fn delete_customer(state: &AppState, name: String, actor: Option<String>) -> Result<i64, AppError> {
  let name = validation::require_text("Customer name", &name)?;

  db::with_conn(&state.db, |conn| {
    let deleted = conn.execute(
      "DELETE FROM customers WHERE LOWER(TRIM(name)) = LOWER(TRIM(?1))",
      params![name],
    )? as i64;
    if deleted > 0 {
      log_activity(conn, &name, &today(), "Customer", "Customer removed from registry", 0.0, actor);
    }
    Ok(deleted)
  })
}

pub fn customer_previous_due(state: &AppState, name: String, exclude_serial: Option<String>) -> Result<f64, AppError> {
  db::with_conn(&state.db, |conn| {
    let invoices = fetch_invoices_for_customer(conn, &name)?;
    let ledger = fetch_ledger_for_customer(conn, &name)?;
    Ok(balance::outstanding_due(&name, &invoices, &ledger, exclude_serial.as_deref()))
  })
}

pub fn customer_statement(state: &AppState, name: String) -> Result<CustomerStatement, AppError> {
  db::with_conn(&state.db, |conn| {
    let customer = match find_customer_by_name(conn, &name) {
      Ok(found) => found,
      Err(err) => {
        tracing::warn!(customer = %name, error = %err, "customer lookup failed for statement");
        None
      }
    };
    let invoices = match fetch_invoices_for_customer(conn, &name) {
      Ok(rows) => rows,
      Err(err) => {
        tracing::warn!(customer = %name, error = %err, "invoice history unavailable for statement");
        Vec::new()
      }
    };
    let ledger = match fetch_ledger_for_customer(conn, &name) {
      Ok(rows) => rows,
      Err(err) => {
        tracing::warn!(customer = %name, error = %err, "ledger history unavailable for statement");
        Vec::new()
      }
    };
    let pending = match fetch_pending_for_customer(conn, &name) {
      Ok(rows) => rows,
      Err(err) => {
        tracing::warn!(customer = %name, error = %err, "pending list unavailable for statement");
        Vec::new()
      }
    };
    let activity = match fetch_activity_for_customer(conn, &name) {
      Ok(rows) => rows,
      Err(err) => {
        tracing::warn!(customer = %name, error = %err, "activity trail unavailable for statement");
        Vec::new()
      }
    };

    let outstanding_due = balance::outstanding_due(&name, &invoices, &ledger, None);

    Ok(CustomerStatement {
      customer,
      invoices,
      ledger,
      pending,
      activity,
      outstanding_due,
    })
  })
}

pub fn post_ledger_entry(state: &AppState, input: LedgerEntryInput, actor: Option<String>) -> Result<LedgerEntry, AppError> {
  let customer_name = validation::require_text("Customer name", &input.customer_name)?;
  validation::parse_date(&input.entry_date)?;
  let description = validation::require_text("Description", &input.description)?;
  validation::ensure_amount_positive("Amount", input.amount)?;

  db::with_conn(&state.db, |conn| {
    let now = Utc::now().to_rfc3339();
    conn.execute(
      "INSERT INTO ledger_entries (customer_name, entry_date, description, amount, kind, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      params![customer_name, input.entry_date, description, input.amount, input.kind.as_str(), now],
    )?;
    let id = conn.last_insert_rowid();

    log_activity(
      conn,
      &customer_name,
      &input.entry_date,
      "Manual Transaction",
      &format!("{}: {}", input.kind.as_str(), description),
      input.amount,
      actor,
    );

    fetch_ledger_by_id(conn, id)
  })
}

pub fn list_ledger_entries(state: &AppState, customer: Option<String>) -> Result<Vec<LedgerEntry>, AppError> {
  let customer = customer.unwrap_or_default();
  let customer_trimmed = customer.trim().to_string();

  db::with_conn(&state.db, |conn| {
    let mut items = Vec::new();
    if customer_trimmed.is_empty() {
      let mut stmt = conn.prepare(
        "SELECT id, customer_name, entry_date, description, amount, kind, created_at
         FROM ledger_entries
         ORDER BY entry_date DESC, id DESC",
      )?;
      let rows = stmt.query_map([], map_ledger_row)?;
      for row in rows {
        items.push(row?);
      }
    } else {
      let mut stmt = conn.prepare(
        "SELECT id, customer_name, entry_date, description, amount, kind, created_at
         FROM ledger_entries
         WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))
         ORDER BY entry_date DESC, id DESC",
      )?;
      let rows = stmt.query_map(params![customer_trimmed], map_ledger_row)?;
      for row in rows {
        items.push(row?);
      }
    }
    Ok(items)
  })
}

pub fn add_pending_item(state: &AppState, input: PendingItemInput, actor: Option<String>) -> Result<PendingItem, AppError> {
  let customer_name = validation::require_text("Customer name", &input.customer_name)?;
  let details = validation::require_text("Details", &input.details)?;
  validation::ensure_money("Quantity", input.quantity)?;
  validation::ensure_money("Rate", input.rate)?;
  let total = match input.total {
    Some(value) => validation::ensure_money("Total", value)?,
    None => input.quantity * input.rate,
  };

  db::with_conn(&state.db, |conn| {
    let now = Utc::now().to_rfc3339();
    conn.execute(
      "INSERT INTO pending_items (customer_name, details, quantity, rate, total, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      params![customer_name, details, input.quantity, input.rate, total, now],
    )?;
    let id = conn.last_insert_rowid();
    log_activity(
      conn,
      &customer_name,
      &today(),
      "Pending Work",
      &format!("Added pending: {details}"),
      total,
      actor,
    );
    fetch_pending_by_id(conn, id)
  })
}

pub fn list_pending_items(state: &AppState, customer: Option<String>) -> Result<Vec<PendingItem>, AppError> {
  let customer = customer.unwrap_or_default();
  let customer_trimmed = customer.trim().to_string();

  db::with_conn(&state.db, |conn| {
    let mut items = Vec::new();
    if customer_trimmed.is_empty() {
      let mut stmt = conn.prepare(
        "SELECT id, customer_name, details, quantity, rate, total, created_at FROM pending_items ORDER BY id",
      )?;
      let rows = stmt.query_map([], map_pending_row)?;
      for row in rows {
        items.push(row?);
      }
    } else {
      let mut stmt = conn.prepare(
        "SELECT id, customer_name, details, quantity, rate, total, created_at
         FROM pending_items
         WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))
         ORDER BY id",
      )?;
      let rows = stmt.query_map(params![customer_trimmed], map_pending_row)?;
      for row in rows {
        items.push(row?);
      }
    }
    Ok(items)
  })
}

pub fn delete_pending_item(state: &AppState, id: i64, actor: Option<String>) -> Result<i64, AppError> {
  db::with_conn(&state.db, |conn| {
    let found = {
      let mut stmt = conn.prepare("SELECT customer_name, details FROM pending_items WHERE id = ?1")?;
      let mut rows = stmt.query(params![id])?;
      match rows.next()? {
        Some(row) => Some((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        None => None,
      }
    };

    let deleted = conn.execute("DELETE FROM pending_items WHERE id = ?1", params![id])? as i64;
    if let Some((customer_name, details)) = found {
      log_activity(
        conn,
        &customer_name,
        &today(),
        "Pending Work",
        &format!("Removed pending: {details}"),
        0.0,
        actor,
      );
    }
    Ok(deleted)
  })
}

pub fn take_pending_items(state: &AppState, customer: String, actor: Option<String>) -> Result<Vec<InvoiceItemInput>, AppError> {
  let customer = validation::require_text("Customer name", &customer)?;

  db::with_conn(&state.db, |conn| {
    let tx = conn.transaction()?;
    let mut taken = Vec::new();
    {
      let mut stmt = tx.prepare(
        "SELECT details, quantity, rate, total
         FROM pending_items
         WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))
         ORDER BY id",
      )?;
      let rows = stmt.query_map(params![customer], |row| {
        Ok(InvoiceItemInput {
          details: row.get(0)?,
          length_ft: None,
          width_ft: None,
          quantity: row.get(1)?,
          rate: row.get(2)?,
          total: Some(row.get(3)?),
        })
      })?;
      for row in rows {
        taken.push(row?);
      }
    }

    tx.execute(
      "DELETE FROM pending_items WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))",
      params![customer],
    )?;

    if !taken.is_empty() {
      let amount: f64 = taken.iter().filter_map(|item| item.total).sum();
      log_activity(
        &tx,
        &customer,
        &today(),
        "Pending Work",
        &format!("Converted {} pending items to memo lines", taken.len()),
        amount,
        actor,
      );
    }

    tx.commit()?;
    Ok(taken)
  })
}

pub fn list_activity(state: &AppState, customer: Option<String>, page: i64, page_size: i64) -> Result<Paginated<ActivityEntry>, AppError> {
  let page = if page < 1 { 1 } else { page };
  let page_size = if page_size < 1 { 100 } else { page_size };
  let offset = (page - 1) * page_size;
  let customer = customer.unwrap_or_default();
  let customer_trimmed = customer.trim().to_string();

  db::with_conn(&state.db, |conn| {
    if customer_trimmed.is_empty() {
      let total: i64 = conn.query_row("SELECT COUNT(*) FROM activity_log", [], |row| row.get(0))?;
      let mut stmt = conn.prepare(
        "SELECT id, customer_name, entry_date, category, description, amount, actor, created_at
         FROM activity_log
         ORDER BY created_at DESC, id DESC
         LIMIT ?1 OFFSET ?2",
      )?;
      let rows = stmt.query_map(params![page_size, offset], map_activity_row)?;
      let mut items = Vec::new();
      for row in rows {
        items.push(row?);
      }
      Ok(Paginated { total, items })
    } else {
      let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM activity_log WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))",
        params![customer_trimmed],
        |row| row.get(0),
      )?;
      let mut stmt = conn.prepare(
        "SELECT id, customer_name, entry_date, category, description, amount, actor, created_at
         FROM activity_log
         WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))
         ORDER BY created_at DESC, id DESC
         LIMIT ?2 OFFSET ?3",
      )?;
      let rows = stmt.query_map(params![customer_trimmed, page_size, offset], map_activity_row)?;
      let mut items = Vec::new();
      for row in rows {
        items.push(row?);
      }
      Ok(Paginated { total, items })
    }
  })
}

pub fn dashboard_stats(state: &AppState) -> Result<DashboardStats, AppError> {
  db::with_conn(&state.db, |conn| reports::dashboard_stats(conn))
}

pub fn export_invoices_csv(
  state: &AppState,
  year: Option<i32>,
  output_path: Option<String>,
  actor: Option<String>,
) -> Result<String, AppError> {
  let export_base = state.export_base.clone();
  db::with_conn(&state.db, |conn| {
    fs::create_dir_all(&export_base)?;
    let filename = match year {
      Some(year) => format!("invoice_register_{year}.csv"),
      None => "invoice_register.csv".to_string(),
    };
    let output_path = output_path.unwrap_or_else(|| export_base.join(&filename).to_string_lossy().to_string());

    if let Some(parent) = PathBuf::from(&output_path).parent() {
      fs::create_dir_all(parent)?;
    }

    csv::export_register_csv(conn, year, PathBuf::from(&output_path).as_path())?;

    log_activity(
      conn,
      "",
      &today(),
      "Export",
      &format!("Register CSV written to {output_path}"),
      0.0,
      actor,
    );
    Ok(output_path)
  })
}

pub fn export_memo_excel(state: &AppState, request: MemoExportRequest) -> Result<String, AppError> {
  let export_base = state.export_base.clone();
  db::with_conn(&state.db, |conn| {
    let invoice = fetch_invoice_by_serial(conn, request.serial.trim())?;
    let shop = settings::get_settings(conn)?;

    let previous_due = if request.include_previous_due {
      let invoices = fetch_invoices_for_customer(conn, &invoice.customer_name)?;
      let ledger = fetch_ledger_for_customer(conn, &invoice.customer_name)?;
      Some(balance::outstanding_due(
        &invoice.customer_name,
        &invoices,
        &ledger,
        Some(&invoice.serial),
      ))
    } else {
      None
    };

    fs::create_dir_all(&export_base)?;
    let default_path = export_base.join(format!("memo_{}.xlsx", invoice.serial));
    let output_path = request
      .output_path
      .unwrap_or_else(|| default_path.to_string_lossy().to_string());
    if let Some(parent) = PathBuf::from(&output_path).parent() {
      fs::create_dir_all(parent)?;
    }

    excel::export_memo(&shop, &invoice, previous_due, PathBuf::from(&output_path).as_path())?;

    log_activity(
      conn,
      &invoice.customer_name,
      &invoice.memo_date,
      "Export",
      &format!("Cash memo #{} written to {output_path}", invoice.serial),
      invoice.grand_total,
      request.actor,
    );
    Ok(output_path)
  })
}

pub fn export_register_excel(state: &AppState, request: RegisterExportRequest) -> Result<String, AppError> {
  let export_base = state.export_base.clone();
  db::with_conn(&state.db, |conn| {
    let shop = settings::get_settings(conn)?;
    let stats = reports::dashboard_stats(conn)?;
    let rows = reports::fetch_register_rows(conn, request.year)?;
    let rollups = reports::customer_rollups(conn)?;

    fs::create_dir_all(&export_base)?;
    let filename = match request.year {
      Some(year) => format!("invoice_register_{year}.xlsx"),
      None => "invoice_register.xlsx".to_string(),
    };
    let output_path = request
      .output_path
      .unwrap_or_else(|| export_base.join(&filename).to_string_lossy().to_string());
    if let Some(parent) = PathBuf::from(&output_path).parent() {
      fs::create_dir_all(parent)?;
    }

    excel::export_register(&shop, &stats, &rows, &rollups, PathBuf::from(&output_path).as_path())?;

    log_activity(
      conn,
      "",
      &today(),
      "Export",
      &format!("Register workbook written to {output_path}"),
      0.0,
      request.actor,
    );
    Ok(output_path)
  })
}

pub fn open_export(state: &AppState, path: String, actor: Option<String>) -> Result<(), AppError> {
  exports::open_export(&path)?;
  db::with_conn(&state.db, |conn| {
    log_activity(conn, "", &today(), "Export", &format!("Opened {path}"), 0.0, actor);
    Ok(())
  })?;
  Ok(())
}

pub fn create_backup(state: &AppState, request: BackupRequest) -> Result<String, AppError> {
  let app_dir = state.app_dir.clone();
  let export_base = state.export_base.clone();
  db::with_conn(&state.db, |conn| {
    db::checkpoint(conn)?;
    let path = backup::create_backup(
      &app_dir,
      &state.db.db_path,
      &export_base,
      request.include_exports,
      request.output_path,
    )?;
    log_activity(
      conn,
      "",
      &today(),
      "Backup",
      &format!("Backup written to {path}"),
      0.0,
      request.actor,
    );
    Ok(path)
  })
}

pub fn restore_backup(state: &AppState, request: RestoreRequest) -> Result<(), AppError> {
  // The WAL must be flat before the database file is swapped, otherwise the
  // reopened connection would replay stale frames over the restored copy.
  db::with_conn(&state.db, |conn| db::checkpoint(conn))?;
  backup::restore_backup(&request.archive_path, &state.db.db_path, &state.export_base)?;
  db::reload_connection(&state.db)?;

  db::with_conn(&state.db, |conn| {
    log_activity(
      conn,
      "",
      &today(),
      "Backup",
      &format!("Restored from {}", request.archive_path),
      0.0,
      request.actor,
    );
    Ok(())
  })?;

  Ok(())
}

pub fn seed_demo_data(state: &AppState, count: i64, actor: Option<String>) -> Result<i64, AppError> {
  let count = count.clamp(1, 10_000) as usize;
  let seed = Utc::now().timestamp_millis() as u64;
  let mut rng = MockRng::new(seed);

  db::with_conn(&state.db, |conn| {
    let tx = conn.transaction()?;
    let floor = settings::get_settings(&tx)?.serial_floor;
    let year = Utc::now().year();

    let names = [
      "Demo Karim Traders",
      "Demo Rahim Stores",
      "Demo Jamal Press House",
      "Demo Hasan Enterprise",
      "Demo Salma Boutique",
    ];
    let works = [
      "Visiting Card",
      "Banner Print",
      "Leaflet",
      "Pad Printing",
      "Poster",
      "Invitation Card",
      "Sticker Sheet",
    ];

    let mut serial_cursor: i64 = derive_next_serial(&tx, floor)?.parse().unwrap_or(floor + 1);
    let now = Utc::now().to_rfc3339();

    let mut invoice_stmt = tx.prepare(
      "INSERT INTO invoices (serial, customer_name, customer_address, customer_mobile, memo_date, grand_total, advance, due, is_paid, is_walk_in, in_words, created_at, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10, ?11, ?11)",
    )?;
    let mut item_stmt = tx.prepare(
      "INSERT INTO invoice_items (invoice_id, position, details, length_ft, width_ft, quantity, rate, total) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;

    for _ in 0..count {
      let name = names[(rng.next_u32() as usize) % names.len()];
      let address = format!("Demo Lane {}", rng.next_u32() % 90 + 1);
      let mobile = format!("01{:09}", rng.next_u32() % 1_000_000_000);
      let month = rng.next_u32() % 12 + 1;
      let day = rng.next_u32() % 28 + 1;
      let memo_date = format!("{year:04}-{month:02}-{day:02}");

      let item_count = (rng.next_u32() % 3 + 1) as usize;
      let mut items = Vec::new();
      for _ in 0..item_count {
        let details = works[(rng.next_u32() as usize) % works.len()];
        let with_dims = (rng.next_u32() % 100) < 30;
        let (length_ft, width_ft) = if with_dims {
          (
            Some((rng.next_u32() % 10 + 1) as f64),
            Some((rng.next_u32() % 4 + 1) as f64),
          )
        } else {
          (None, None)
        };
        items.push(InvoiceItemInput {
          details: details.to_string(),
          length_ft,
          width_ft,
          quantity: (rng.next_u32() % 20 + 1) as f64,
          rate: (rng.next_u32() % 90 + 10) as f64,
          total: None,
        });
      }

      let unpaid = totals::recompute_invoice(&items, 0.0);
      let advance = match rng.next_u32() % 3 {
        0 => 0.0,
        1 => (unpaid.grand_total / 2.0 * 100.0).round() / 100.0,
        _ => unpaid.grand_total,
      };
      let totals = totals::recompute_invoice(&items, advance);

      let serial = serial_cursor.to_string();
      serial_cursor += 1;

      invoice_stmt.execute(params![
        serial,
        name,
        address,
        mobile,
        memo_date,
        totals.grand_total,
        advance,
        totals.due,
        if totals.is_paid { 1 } else { 0 },
        totals.in_words,
        now
      ])?;
      let invoice_id = tx.last_insert_rowid();

      for (position, (item, total)) in items.iter().zip(totals.item_totals.iter()).enumerate() {
        item_stmt.execute(params![
          invoice_id,
          position as i64,
          item.details,
          item.length_ft,
          item.width_ft,
          item.quantity,
          item.rate,
          *total
        ])?;
      }

      tx.execute(
        "INSERT INTO customers (name, address, mobile, opening_balance, created_at, updated_at)
         VALUES (?1, ?2, ?3, 0, ?4, ?4)
         ON CONFLICT(name) DO UPDATE SET updated_at = excluded.updated_at",
        params![name, address, mobile, now],
      )?;
    }

    drop(invoice_stmt);
    drop(item_stmt);

    log_activity(&tx, "", &today(), "Demo", &format!("Seeded {count} demo memos"), 0.0, actor);

    tx.commit()?;
    Ok(count as i64)
  })
}

pub fn clear_demo_data(state: &AppState, actor: Option<String>) -> Result<i64, AppError> {
  db::with_conn(&state.db, |conn| {
    let tx = conn.transaction()?;
    let mut deleted = 0_i64;
    deleted += tx.execute(
      "DELETE FROM invoice_items WHERE invoice_id IN (SELECT id FROM invoices WHERE customer_name LIKE 'Demo %')",
      [],
    )? as i64;
    deleted += tx.execute("DELETE FROM invoices WHERE customer_name LIKE 'Demo %'", [])? as i64;
    deleted += tx.execute("DELETE FROM ledger_entries WHERE customer_name LIKE 'Demo %'", [])? as i64;
    deleted += tx.execute("DELETE FROM pending_items WHERE customer_name LIKE 'Demo %'", [])? as i64;
    deleted += tx.execute("DELETE FROM activity_log WHERE customer_name LIKE 'Demo %'", [])? as i64;
    deleted += tx.execute("DELETE FROM customers WHERE name LIKE 'Demo %'", [])? as i64;

    log_activity(&tx, "", &today(), "Demo", &format!("Removed {deleted} demo rows"), 0.0, actor);

    tx.commit()?;
    Ok(deleted)
  })
}

fn log_activity(
  conn: &Connection,
  customer_name: &str,
  entry_date: &str,
  category: &str,
  description: &str,
  amount: f64,
  actor: Option<String>,
) {
  if let Err(err) = append_activity(conn, customer_name, entry_date, category, description, amount, actor) {
    tracing::warn!(category, error = %err, "activity append failed");
  }
}

fn today() -> String {
  Utc::now().format("%Y-%m-%d").to_string()
}

fn derive_next_serial(conn: &Connection, floor: i64) -> Result<String, AppError> {
  let mut stmt = conn.prepare("SELECT serial FROM invoices")?;
  let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
  let serials: Vec<String> = rows.filter_map(Result::ok).collect();
  Ok(serial::next_serial(serials.iter().map(String::as_str), floor))
}

fn fetch_invoice_by_serial(conn: &Connection, serial: &str) -> Result<InvoiceRecord, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, serial, customer_name, customer_address, customer_mobile, memo_date, grand_total, advance, due, is_paid, is_walk_in, in_words, created_at, updated_at
     FROM invoices WHERE serial = ?1",
  )?;
  let mut invoice = stmt
    .query_row(params![serial], |row| {
      Ok(InvoiceRecord {
        id: row.get(0)?,
        serial: row.get(1)?,
        customer_name: row.get(2)?,
        customer_address: row.get(3)?,
        customer_mobile: row.get(4)?,
        memo_date: row.get(5)?,
        grand_total: row.get(6)?,
        advance: row.get(7)?,
        due: row.get(8)?,
        is_paid: row.get::<_, i64>(9)? != 0,
        is_walk_in: row.get::<_, i64>(10)? != 0,
        in_words: row.get(11)?,
        items: Vec::new(),
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
      })
    })
    .map_err(|_| AppError::new("NOT_FOUND", "Invoice not found"))?;

  let mut item_stmt = conn.prepare(
    "SELECT id, details, length_ft, width_ft, quantity, rate, total
     FROM invoice_items WHERE invoice_id = ?1 ORDER BY position",
  )?;
  let rows = item_stmt.query_map(params![invoice.id], |row| {
    Ok(InvoiceItem {
      id: row.get(0)?,
      details: row.get(1)?,
      length_ft: row.get(2)?,
      width_ft: row.get(3)?,
      quantity: row.get(4)?,
      rate: row.get(5)?,
      total: row.get(6)?,
    })
  })?;
  for row in rows {
    invoice.items.push(row?);
  }

  Ok(invoice)
}

fn fetch_invoices_for_customer(conn: &Connection, name: &str) -> Result<Vec<InvoiceSummary>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, serial, customer_name, customer_mobile, memo_date, grand_total, advance, due, is_paid, is_walk_in,
        (SELECT COUNT(*) FROM invoice_items WHERE invoice_id = invoices.id)
     FROM invoices
     WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))
     ORDER BY CAST(serial AS INTEGER) DESC",
  )?;
  let rows = stmt.query_map(params![name], reports::map_summary_row)?;
  let mut items = Vec::new();
  for row in rows {
    items.push(row?);
  }
  Ok(items)
}

fn fetch_ledger_for_customer(conn: &Connection, name: &str) -> Result<Vec<LedgerEntry>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, customer_name, entry_date, description, amount, kind, created_at
     FROM ledger_entries
     WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))
     ORDER BY entry_date DESC, id DESC",
  )?;
  let rows = stmt.query_map(params![name], map_ledger_row)?;
  let mut items = Vec::new();
  for row in rows {
    items.push(row?);
  }
  Ok(items)
}

fn fetch_pending_for_customer(conn: &Connection, name: &str) -> Result<Vec<PendingItem>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, customer_name, details, quantity, rate, total, created_at
     FROM pending_items
     WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))
     ORDER BY id",
  )?;
  let rows = stmt.query_map(params![name], map_pending_row)?;
  let mut items = Vec::new();
  for row in rows {
    items.push(row?);
  }
  Ok(items)
}

fn fetch_activity_for_customer(conn: &Connection, name: &str) -> Result<Vec<ActivityEntry>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, customer_name, entry_date, category, description, amount, actor, created_at
     FROM activity_log
     WHERE LOWER(TRIM(customer_name)) = LOWER(TRIM(?1))
     ORDER BY created_at DESC, id DESC",
  )?;
  let rows = stmt.query_map(params![name], map_activity_row)?;
  let mut items = Vec::new();
  for row in rows {
    items.push(row?);
  }
  Ok(items)
}

fn fetch_customer_by_name(conn: &Connection, name: &str) -> Result<Customer, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, name, address, mobile, opening_balance, created_at, updated_at
     FROM customers WHERE LOWER(TRIM(name)) = LOWER(TRIM(?1))",
  )?;
  let customer = stmt
    .query_row(params![name], map_customer_row)
    .map_err(|_| AppError::new("NOT_FOUND", "Customer not found"))?;
  Ok(customer)
}

fn find_customer_by_name(conn: &Connection, name: &str) -> Result<Option<Customer>, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, name, address, mobile, opening_balance, created_at, updated_at
     FROM customers WHERE LOWER(TRIM(name)) = LOWER(TRIM(?1))",
  )?;
  let mut rows = stmt.query(params![name])?;
  if let Some(row) = rows.next()? {
    Ok(Some(map_customer_row(row)?))
  } else {
    Ok(None)
  }
}

fn fetch_ledger_by_id(conn: &Connection, id: i64) -> Result<LedgerEntry, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, customer_name, entry_date, description, amount, kind, created_at FROM ledger_entries WHERE id = ?1",
  )?;
  let entry = stmt
    .query_row(params![id], map_ledger_row)
    .map_err(|_| AppError::new("NOT_FOUND", "Ledger entry not found"))?;
  Ok(entry)
}

fn fetch_pending_by_id(conn: &Connection, id: i64) -> Result<PendingItem, AppError> {
  let mut stmt = conn.prepare(
    "SELECT id, customer_name, details, quantity, rate, total, created_at FROM pending_items WHERE id = ?1",
  )?;
  let item = stmt
    .query_row(params![id], map_pending_row)
    .map_err(|_| AppError::new("NOT_FOUND", "Pending item not found"))?;
  Ok(item)
}

fn map_customer_row(row: &rusqlite::Row) -> Result<Customer, rusqlite::Error> {
  Ok(Customer {
    id: row.get(0)?,
    name: row.get(1)?,
    address: row.get(2)?,
    mobile: row.get(3)?,
    opening_balance: row.get(4)?,
    created_at: row.get(5)?,
    updated_at: row.get(6)?,
  })
}

fn map_ledger_row(row: &rusqlite::Row) -> Result<LedgerEntry, rusqlite::Error> {
  let kind: String = row.get(5)?;
  Ok(LedgerEntry {
    id: row.get(0)?,
    customer_name: row.get(1)?,
    entry_date: row.get(2)?,
    description: row.get(3)?,
    amount: row.get(4)?,
    kind: LedgerKind::parse(&kind).unwrap_or(LedgerKind::Due),
    created_at: row.get(6)?,
  })
}

fn map_pending_row(row: &rusqlite::Row) -> Result<PendingItem, rusqlite::Error> {
  Ok(PendingItem {
    id: row.get(0)?,
    customer_name: row.get(1)?,
    details: row.get(2)?,
    quantity: row.get(3)?,
    rate: row.get(4)?,
    total: row.get(5)?,
    created_at: row.get(6)?,
  })
}

fn map_activity_row(row: &rusqlite::Row) -> Result<ActivityEntry, rusqlite::Error> {
  Ok(ActivityEntry {
    id: row.get(0)?,
    customer_name: row.get(1)?,
    entry_date: row.get(2)?,
    category: row.get(3)?,
    description: row.get(4)?,
    amount: row.get(5)?,
    actor: row.get(6)?,
    created_at: row.get(7)?,
  })
}

struct MockRng {
  state: u64,
}

impl MockRng {
  fn new(seed: u64) -> Self {
    Self { state: seed }
  }

  fn next_u32(&mut self) -> u32 {
    self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
    (self.state >> 32) as u32
  }
}
