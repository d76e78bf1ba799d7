use std::fs;
use std::path::Path;

use master_press_khata::commands;
use master_press_khata::models::{
  BackupRequest, CustomerInput, InvoiceFilter, InvoiceInput, InvoiceItemInput, LedgerEntryInput,
  LedgerKind, MemoExportRequest, PendingItemInput, RegisterExportRequest, RestoreRequest,
};
use master_press_khata::AppState;
use tempfile::TempDir;

fn test_state() -> (TempDir, AppState) {
  let dir = TempDir::new().expect("temp dir");
  let state = AppState::open_at(dir.path().to_path_buf()).expect("app state");
  (dir, state)
}

fn item(details: &str, quantity: f64, rate: f64) -> InvoiceItemInput {
  InvoiceItemInput {
    details: details.to_string(),
    length_ft: None,
    width_ft: None,
    quantity,
    rate,
    total: None,
  }
}

fn memo(customer: &str, items: Vec<InvoiceItemInput>, advance: f64) -> InvoiceInput {
  InvoiceInput {
    serial: None,
    customer_name: customer.to_string(),
    customer_address: Some("College Road, Feni".to_string()),
    customer_mobile: Some("01711000001".to_string()),
    memo_date: "2026-03-10".to_string(),
    advance,
    is_walk_in: false,
    items,
  }
}

fn default_filter() -> InvoiceFilter {
  InvoiceFilter {
    search: None,
    status: None,
    page: 1,
    page_size: 50,
  }
}

#[test]
fn initializes_store_with_defaults() {
  let (dir, state) = test_state();
  assert!(dir.path().join("master_press.sqlite").exists());
  assert!(dir.path().join("Exports").is_dir());
  assert_eq!(state.export_base, dir.path().join("Exports"));

  let settings = commands::get_settings(&state).expect("settings");
  assert_eq!(settings.shop_name, "Master Computer & Printing Press");
  assert_eq!(settings.serial_floor, 10_000);
}

#[test]
fn saves_invoice_with_derived_serial_and_totals() {
  let (_dir, state) = test_state();

  let mut banner = item("Banner Print", 1.0, 20.0);
  banner.length_ft = Some(2.0);
  banner.width_ft = Some(3.0);
  let input = memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0), banner], 300.0);

  let saved = commands::save_invoice(&state, input, None).expect("save invoice");
  assert_eq!(saved.serial, "10001");
  assert_eq!(saved.grand_total, 1120.0);
  assert_eq!(saved.advance, 300.0);
  assert_eq!(saved.due, 820.0);
  assert!(!saved.is_paid);
  assert_eq!(saved.in_words, "One Thousand One Hundred and Twenty Taka Only.");
  assert_eq!(saved.items.len(), 2);
  assert_eq!(saved.items[1].total, 120.0);

  let customers = commands::list_customers(&state, None).expect("customers");
  assert_eq!(customers.len(), 1);
  assert_eq!(customers[0].name, "Karim Traders");
  assert_eq!(customers[0].invoice_count, 1);
  assert_eq!(customers[0].total_due, 820.0);
}

#[test]
fn walk_in_memo_skips_customer_registry() {
  let (_dir, state) = test_state();

  let mut input = memo("Walk In Customer", vec![item("Leaflet", 5.0, 10.0)], 0.0);
  input.is_walk_in = true;
  let saved = commands::save_invoice(&state, input, None).expect("save invoice");
  assert!(saved.is_walk_in);

  let customers = commands::list_customers(&state, None).expect("customers");
  assert!(customers.is_empty());
}

#[test]
fn resaving_a_serial_replaces_items() {
  let (_dir, state) = test_state();

  let first = commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Poster", 2.0, 50.0), item("Leaflet", 10.0, 5.0)], 0.0),
    None,
  )
  .expect("first save");
  assert_eq!(first.items.len(), 2);
  assert_eq!(first.grand_total, 150.0);

  let mut replacement = memo("Karim Traders", vec![item("Poster", 4.0, 50.0)], 50.0);
  replacement.serial = Some(first.serial.clone());
  let updated = commands::save_invoice(&state, replacement, None).expect("second save");

  assert_eq!(updated.serial, first.serial);
  assert_eq!(updated.items.len(), 1);
  assert_eq!(updated.grand_total, 200.0);
  assert_eq!(updated.due, 150.0);

  let listed = commands::list_invoices(&state, default_filter()).expect("list");
  assert_eq!(listed.total, 1);
}

#[test]
fn deleting_a_memo_cascades_to_items() {
  let (_dir, state) = test_state();

  let saved = commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Poster", 2.0, 50.0), item("Leaflet", 10.0, 5.0)], 0.0),
    None,
  )
  .expect("save");

  let deleted = commands::delete_invoice(&state, saved.serial.clone(), None).expect("delete");
  assert_eq!(deleted, 3);

  let missing = commands::get_invoice(&state, saved.serial).unwrap_err();
  assert_eq!(missing.code, "NOT_FOUND");
}

#[test]
fn payment_updates_rederive_due_and_flag() {
  let (_dir, state) = test_state();

  let saved = commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 0.0),
    None,
  )
  .expect("save");
  assert!(!saved.is_paid);

  let partial = commands::update_invoice_payment(&state, saved.serial.clone(), 400.0, None).expect("partial");
  assert_eq!(partial.advance, 400.0);
  assert_eq!(partial.due, 600.0);
  assert!(!partial.is_paid);

  let settled = commands::update_invoice_payment(&state, saved.serial.clone(), 1000.0, None).expect("settled");
  assert_eq!(settled.due, 0.0);
  assert!(settled.is_paid);

  let overpaid = commands::update_invoice_payment(&state, saved.serial, 1200.0, None).expect("overpaid");
  assert_eq!(overpaid.due, 0.0);
  assert!(overpaid.is_paid);
}

#[test]
fn mark_paid_settles_in_full() {
  let (_dir, state) = test_state();

  let saved = commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 300.0),
    None,
  )
  .expect("save");

  let paid = commands::mark_invoice_paid(&state, saved.serial, None).expect("mark paid");
  assert_eq!(paid.advance, 1000.0);
  assert_eq!(paid.due, 0.0);
  assert!(paid.is_paid);
}

#[test]
fn serials_respect_a_raised_floor() {
  let (_dir, state) = test_state();

  let first = commands::save_invoice(&state, memo("Karim Traders", vec![item("Poster", 1.0, 10.0)], 0.0), None)
    .expect("first");
  let second = commands::save_invoice(&state, memo("Rahim Stores", vec![item("Poster", 1.0, 10.0)], 0.0), None)
    .expect("second");
  assert_eq!(first.serial, "10001");
  assert_eq!(second.serial, "10002");
  assert_eq!(commands::next_invoice_serial(&state).expect("next"), "10003");

  let mut settings = commands::get_settings(&state).expect("settings");
  settings.serial_floor = 20_000;
  commands::update_settings(&state, settings, None).expect("update settings");

  assert_eq!(commands::next_invoice_serial(&state).expect("next"), "20001");
}

#[test]
fn negative_serial_floor_is_rejected() {
  let (_dir, state) = test_state();

  let mut settings = commands::get_settings(&state).expect("settings");
  settings.serial_floor = -1;
  let err = commands::update_settings(&state, settings, None).unwrap_err();
  assert_eq!(err.code, "INVALID_FLOOR");
}

#[test]
fn previous_due_combines_invoices_and_ledger() {
  let (_dir, state) = test_state();

  let saved = commands::save_invoice(
    &state,
    memo("Rahim Stores", vec![item("Visiting Card", 2.0, 500.0)], 300.0),
    None,
  )
  .expect("save");

  commands::post_ledger_entry(
    &state,
    LedgerEntryInput {
      customer_name: "Rahim Stores".to_string(),
      entry_date: "2026-03-11".to_string(),
      description: "Binding charge".to_string(),
      amount: 300.0,
      kind: LedgerKind::Due,
    },
    None,
  )
  .expect("due entry");
  commands::post_ledger_entry(
    &state,
    LedgerEntryInput {
      customer_name: "rahim stores".to_string(),
      entry_date: "2026-03-12".to_string(),
      description: "Cash deposit".to_string(),
      amount: 450.0,
      kind: LedgerKind::Deposit,
    },
    None,
  )
  .expect("deposit entry");

  let due = commands::customer_previous_due(&state, "RAHIM STORES".to_string(), None).expect("due");
  assert_eq!(due, 550.0);

  let excluding = commands::customer_previous_due(&state, "Rahim Stores".to_string(), Some(saved.serial))
    .expect("due excluding");
  assert_eq!(excluding, -150.0);
}

#[test]
fn statement_collects_every_section() {
  let (_dir, state) = test_state();

  commands::save_customer(
    &state,
    CustomerInput {
      name: "Karim Traders".to_string(),
      address: Some("College Road, Feni".to_string()),
      mobile: Some("01711000001".to_string()),
      opening_balance: None,
    },
    None,
  )
  .expect("customer");
  commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 300.0),
    None,
  )
  .expect("invoice");
  commands::post_ledger_entry(
    &state,
    LedgerEntryInput {
      customer_name: "Karim Traders".to_string(),
      entry_date: "2026-03-11".to_string(),
      description: "Binding charge".to_string(),
      amount: 100.0,
      kind: LedgerKind::Due,
    },
    None,
  )
  .expect("ledger");
  commands::add_pending_item(
    &state,
    PendingItemInput {
      customer_name: "Karim Traders".to_string(),
      details: "Poster".to_string(),
      quantity: 4.0,
      rate: 25.0,
      total: None,
    },
    None,
  )
  .expect("pending");

  let statement = commands::customer_statement(&state, "karim traders".to_string()).expect("statement");
  assert!(statement.customer.is_some());
  assert_eq!(statement.invoices.len(), 1);
  assert_eq!(statement.ledger.len(), 1);
  assert_eq!(statement.pending.len(), 1);
  assert!(statement.activity.len() >= 4);
  assert_eq!(statement.outstanding_due, 800.0);
}

#[test]
fn statement_for_unknown_customer_is_empty() {
  let (_dir, state) = test_state();

  let statement = commands::customer_statement(&state, "Ghost".to_string()).expect("statement");
  assert!(statement.customer.is_none());
  assert!(statement.invoices.is_empty());
  assert!(statement.ledger.is_empty());
  assert!(statement.pending.is_empty());
  assert!(statement.activity.is_empty());
  assert_eq!(statement.outstanding_due, 0.0);
}

#[test]
fn pending_items_convert_to_memo_lines() {
  let (_dir, state) = test_state();

  commands::add_pending_item(
    &state,
    PendingItemInput {
      customer_name: "Karim Traders".to_string(),
      details: "Poster".to_string(),
      quantity: 4.0,
      rate: 25.0,
      total: None,
    },
    None,
  )
  .expect("pending 1");
  commands::add_pending_item(
    &state,
    PendingItemInput {
      customer_name: "karim traders".to_string(),
      details: "Sticker Sheet".to_string(),
      quantity: 2.0,
      rate: 30.0,
      total: Some(70.0),
    },
    None,
  )
  .expect("pending 2");

  let taken = commands::take_pending_items(&state, "KARIM TRADERS".to_string(), None).expect("take");
  assert_eq!(taken.len(), 2);
  assert_eq!(taken[0].total, Some(100.0));
  assert_eq!(taken[1].total, Some(70.0));
  assert!(commands::list_pending_items(&state, None).expect("pending").is_empty());

  let saved = commands::save_invoice(&state, memo("Karim Traders", taken, 0.0), None).expect("save");
  assert_eq!(saved.grand_total, 170.0);
}

#[test]
fn deleting_missing_pending_item_is_zero() {
  let (_dir, state) = test_state();
  let deleted = commands::delete_pending_item(&state, 9999, None).expect("delete");
  assert_eq!(deleted, 0);
}

#[test]
fn invoice_list_filters_and_paginates() {
  let (_dir, state) = test_state();

  commands::save_invoice(&state, memo("Alpha Press", vec![item("Poster", 10.0, 100.0)], 1000.0), None)
    .expect("paid");
  commands::save_invoice(&state, memo("Beta Traders", vec![item("Poster", 10.0, 100.0)], 400.0), None)
    .expect("partial");
  commands::save_invoice(&state, memo("Gamma Works", vec![item("Poster", 10.0, 50.0)], 0.0), None)
    .expect("unpaid");

  let mut paid_filter = default_filter();
  paid_filter.status = Some("paid".to_string());
  assert_eq!(commands::list_invoices(&state, paid_filter).expect("paid list").total, 1);

  let mut unpaid_filter = default_filter();
  unpaid_filter.status = Some("unpaid".to_string());
  assert_eq!(commands::list_invoices(&state, unpaid_filter).expect("unpaid list").total, 2);

  let mut search_filter = default_filter();
  search_filter.search = Some("Beta".to_string());
  let found = commands::list_invoices(&state, search_filter).expect("search list");
  assert_eq!(found.total, 1);
  assert_eq!(found.items[0].customer_name, "Beta Traders");

  let mut page_one = default_filter();
  page_one.page_size = 2;
  let first_page = commands::list_invoices(&state, page_one).expect("page one");
  assert_eq!(first_page.total, 3);
  assert_eq!(first_page.items.len(), 2);

  let mut page_two = default_filter();
  page_two.page = 2;
  page_two.page_size = 2;
  let second_page = commands::list_invoices(&state, page_two).expect("page two");
  assert_eq!(second_page.items.len(), 1);
  assert_eq!(second_page.items[0].serial, "10001");
}

#[test]
fn dashboard_classifies_payment_states() {
  let (_dir, state) = test_state();

  commands::save_invoice(&state, memo("Alpha Press", vec![item("Poster", 10.0, 100.0)], 1000.0), None)
    .expect("paid");
  commands::save_invoice(&state, memo("Beta Traders", vec![item("Poster", 10.0, 100.0)], 400.0), None)
    .expect("partial");
  commands::save_invoice(&state, memo("Gamma Works", vec![item("Poster", 10.0, 50.0)], 0.0), None)
    .expect("unpaid");

  let stats = commands::dashboard_stats(&state).expect("stats");
  assert_eq!(stats.invoice_count, 3);
  assert_eq!(stats.paid_count, 1);
  assert_eq!(stats.partial_count, 1);
  assert_eq!(stats.unpaid_count, 1);
  assert_eq!(stats.total_revenue, 1400.0);
  assert_eq!(stats.pending_revenue, 1100.0);
  assert_eq!(stats.customer_count, 3);
}

#[test]
fn csv_export_writes_register_file() {
  let (_dir, state) = test_state();

  commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 300.0),
    None,
  )
  .expect("save");

  let path = commands::export_invoices_csv(&state, None, None, None).expect("csv export");
  let content = fs::read_to_string(&path).expect("read csv");
  assert!(content.starts_with("serial,memo_date,customer_name"));
  assert!(content.contains("10001"));
  assert!(content.contains("Karim Traders"));
  assert!(content.contains("PARTIAL"));
}

#[test]
fn memo_workbook_export_writes_file() {
  let (_dir, state) = test_state();

  let saved = commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 300.0),
    None,
  )
  .expect("save");

  let path = commands::export_memo_excel(
    &state,
    MemoExportRequest {
      serial: saved.serial,
      include_previous_due: true,
      output_path: None,
      actor: None,
    },
  )
  .expect("memo export");
  assert!(path.ends_with("memo_10001.xlsx"));
  assert!(Path::new(&path).exists());
}

#[test]
fn register_workbook_export_writes_file() {
  let (_dir, state) = test_state();

  commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 300.0),
    None,
  )
  .expect("save");

  let path = commands::export_register_excel(
    &state,
    RegisterExportRequest {
      year: None,
      output_path: None,
      actor: None,
    },
  )
  .expect("register export");
  assert!(path.ends_with("invoice_register.xlsx"));
  assert!(Path::new(&path).exists());
}

#[test]
fn backup_and_restore_round_trip() {
  let (_dir, state) = test_state();

  let saved = commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 0.0),
    None,
  )
  .expect("save");

  let archive = commands::create_backup(
    &state,
    BackupRequest {
      include_exports: false,
      output_path: None,
      actor: None,
    },
  )
  .expect("backup");
  assert!(Path::new(&archive).exists());

  commands::delete_invoice(&state, saved.serial.clone(), None).expect("delete");
  assert!(commands::get_invoice(&state, saved.serial.clone()).is_err());

  commands::restore_backup(
    &state,
    RestoreRequest {
      archive_path: archive,
      actor: None,
    },
  )
  .expect("restore");

  let restored = commands::get_invoice(&state, saved.serial).expect("restored memo");
  assert_eq!(restored.grand_total, 1000.0);
  assert_eq!(restored.items.len(), 1);
  assert!(state.db.db_path.with_extension("bak").exists());
}

#[test]
fn clear_demo_preserves_real_rows() {
  let (_dir, state) = test_state();

  let seeded = commands::seed_demo_data(&state, 5, None).expect("seed");
  assert_eq!(seeded, 5);

  commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 0.0),
    None,
  )
  .expect("real invoice");
  assert_eq!(commands::list_invoices(&state, default_filter()).expect("list").total, 6);

  let removed = commands::clear_demo_data(&state, None).expect("clear");
  assert!(removed > 0);

  let listed = commands::list_invoices(&state, default_filter()).expect("list");
  assert_eq!(listed.total, 1);
  assert_eq!(listed.items[0].customer_name, "Karim Traders");

  let customers = commands::list_customers(&state, None).expect("customers");
  assert_eq!(customers.len(), 1);
  assert_eq!(customers[0].name, "Karim Traders");
}

#[test]
fn opening_balance_only_updates_when_provided() {
  let (_dir, state) = test_state();

  let created = commands::save_customer(
    &state,
    CustomerInput {
      name: "Karim Traders".to_string(),
      address: Some("College Road".to_string()),
      mobile: Some("01711000001".to_string()),
      opening_balance: Some(250.0),
    },
    None,
  )
  .expect("create");
  assert_eq!(created.opening_balance, 250.0);

  let untouched = commands::save_customer(
    &state,
    CustomerInput {
      name: "Karim Traders".to_string(),
      address: Some("Station Road".to_string()),
      mobile: Some("01711000002".to_string()),
      opening_balance: None,
    },
    None,
  )
  .expect("update without balance");
  assert_eq!(untouched.opening_balance, 250.0);
  assert_eq!(untouched.address.as_deref(), Some("Station Road"));

  let adjusted = commands::save_customer(
    &state,
    CustomerInput {
      name: "Karim Traders".to_string(),
      address: Some("Station Road".to_string()),
      mobile: Some("01711000002".to_string()),
      opening_balance: Some(100.0),
    },
    None,
  )
  .expect("update with balance");
  assert_eq!(adjusted.opening_balance, 100.0);
}

#[test]
fn activity_trail_records_mutations() {
  let (_dir, state) = test_state();

  let saved = commands::save_invoice(
    &state,
    memo("Karim Traders", vec![item("Visiting Card", 2.0, 500.0)], 0.0),
    None,
  )
  .expect("save");
  commands::update_invoice_payment(&state, saved.serial, 400.0, None).expect("pay");
  commands::post_ledger_entry(
    &state,
    LedgerEntryInput {
      customer_name: "Karim Traders".to_string(),
      entry_date: "2026-03-11".to_string(),
      description: "Binding charge".to_string(),
      amount: 100.0,
      kind: LedgerKind::Due,
    },
    None,
  )
  .expect("ledger");

  let scoped = commands::list_activity(&state, Some("karim traders".to_string()), 1, 50).expect("scoped");
  assert_eq!(scoped.total, 3);

  let paged = commands::list_activity(&state, None, 1, 2).expect("paged");
  assert_eq!(paged.total, 3);
  assert_eq!(paged.items.len(), 2);
  assert_eq!(paged.items[0].category, "Manual Transaction");
}

#[test]
fn rejects_invalid_invoice_input() {
  let (_dir, state) = test_state();

  let blank = memo("   ", vec![item("Poster", 1.0, 10.0)], 0.0);
  assert_eq!(commands::save_invoice(&state, blank, None).unwrap_err().code, "REQUIRED");

  let mut bad_date = memo("Karim Traders", vec![item("Poster", 1.0, 10.0)], 0.0);
  bad_date.memo_date = "10-03-2026".to_string();
  assert_eq!(commands::save_invoice(&state, bad_date, None).unwrap_err().code, "INVALID_DATE");

  let negative = memo("Karim Traders", vec![item("Poster", 1.0, 10.0)], -5.0);
  assert_eq!(commands::save_invoice(&state, negative, None).unwrap_err().code, "INVALID_AMOUNT");

  assert_eq!(commands::list_invoices(&state, default_filter()).expect("list").total, 0);
}

#[test]
fn open_export_requires_existing_file() {
  let (dir, state) = test_state();
  let missing = dir.path().join("Exports").join("missing.xlsx");
  let err = commands::open_export(&state, missing.to_string_lossy().to_string(), None).unwrap_err();
  assert_eq!(err.code, "NOT_FOUND");
}
