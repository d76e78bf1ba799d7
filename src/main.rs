use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use master_press_khata::commands;
use master_press_khata::domain::{validation, words};
use master_press_khata::error::AppError;
use master_press_khata::models::{
  BackupRequest, InvoiceFilter, MemoExportRequest, RegisterExportRequest, RestoreRequest,
};
use master_press_khata::AppState;

const USAGE: &str = "\
master-press-khata <command> [args]

  stats                                 dashboard totals
  settings                              show the shop profile
  update-settings <json>                replace the shop profile
  next-serial                           peek the next memo serial
  save-invoice <json>                   create or update a memo
  show <serial>                         fetch one memo
  list [filter-json]                    page through memos
  delete-invoice <serial>               remove a memo and its lines
  pay <serial> <advance>                set the advance on a memo
  mark-paid <serial>                    settle a memo in full
  save-customer <json>                  create or update a customer
  customers [search]                    customer balances
  delete-customer <name>                remove a customer profile
  previous-due <name> [skip-serial]     outstanding balance
  statement <name>                      full customer statement
  post <json>                           record a deposit or due
  ledger [customer]                     manual transactions
  add-pending <json>                    queue a pending work item
  pending [customer]                    list pending work
  delete-pending <id>                   drop a pending item
  take-pending <customer>               convert pending work to memo lines
  activity [customer] [page] [size]     activity trail
  words <amount>                        render an amount in words
  export-csv [year]                     write the register CSV
  export-memo <serial> [previous-due]   write a cash memo workbook
  export-register [year]                write the register workbook
  open <path>                           open an exported file
  backup [output-path]                  zip the database and exports
  restore <archive>                     restore from a backup zip
  seed [count]                          insert demo data
  clear-demo                            delete demo rows
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::registry()
    .with(tracing_subscriber::EnvFilter::new(
      std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
    ))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let args: Vec<String> = std::env::args().skip(1).collect();
  let command = args.first().map(String::as_str).unwrap_or("help");

  if command == "help" || command == "--help" || command == "-h" {
    println!("{USAGE}");
    return Ok(());
  }

  if command == "words" {
    let amount = validation::parse_money("amount", require_arg(&args, 1, "amount")?)?;
    println!("{}", words::amount_in_words(amount));
    return Ok(());
  }

  let state = AppState::open()?;
  run(&state, command, &args)?;
  Ok(())
}

fn run(state: &AppState, command: &str, args: &[String]) -> Result<(), AppError> {
  match command {
    "stats" => print_json(&commands::dashboard_stats(state)?),
    "settings" => print_json(&commands::get_settings(state)?),
    "update-settings" => {
      let input = parse_json_arg(args, 1, "settings json")?;
      print_json(&commands::update_settings(state, input, None)?)
    }
    "next-serial" => {
      let serial = commands::next_invoice_serial(state)?;
      println!("{serial}");
      Ok(())
    }
    "save-invoice" => {
      let input = parse_json_arg(args, 1, "invoice json")?;
      print_json(&commands::save_invoice(state, input, None)?)
    }
    "show" => {
      let serial = require_arg(args, 1, "serial")?.to_string();
      print_json(&commands::get_invoice(state, serial)?)
    }
    "list" => {
      let filter = match args.get(1) {
        Some(raw) => serde_json::from_str(raw)?,
        None => InvoiceFilter {
          search: None,
          status: None,
          page: 1,
          page_size: 50,
        },
      };
      print_json(&commands::list_invoices(state, filter)?)
    }
    "delete-invoice" => {
      let serial = require_arg(args, 1, "serial")?.to_string();
      print_json(&commands::delete_invoice(state, serial, None)?)
    }
    "pay" => {
      let serial = require_arg(args, 1, "serial")?.to_string();
      let advance = validation::parse_money("advance", require_arg(args, 2, "advance")?)?;
      print_json(&commands::update_invoice_payment(state, serial, advance, None)?)
    }
    "mark-paid" => {
      let serial = require_arg(args, 1, "serial")?.to_string();
      print_json(&commands::mark_invoice_paid(state, serial, None)?)
    }
    "save-customer" => {
      let input = parse_json_arg(args, 1, "customer json")?;
      print_json(&commands::save_customer(state, input, None)?)
    }
    "customers" => print_json(&commands::list_customers(state, optional_arg(args, 1))?),
    "delete-customer" => {
      let name = require_arg(args, 1, "name")?.to_string();
      print_json(&commands::delete_customer(state, name, None)?)
    }
    "previous-due" => {
      let name = require_arg(args, 1, "name")?.to_string();
      print_json(&commands::customer_previous_due(state, name, optional_arg(args, 2))?)
    }
    "statement" => {
      let name = require_arg(args, 1, "name")?.to_string();
      print_json(&commands::customer_statement(state, name)?)
    }
    "post" => {
      let input = parse_json_arg(args, 1, "ledger json")?;
      print_json(&commands::post_ledger_entry(state, input, None)?)
    }
    "ledger" => print_json(&commands::list_ledger_entries(state, optional_arg(args, 1))?),
    "add-pending" => {
      let input = parse_json_arg(args, 1, "pending json")?;
      print_json(&commands::add_pending_item(state, input, None)?)
    }
    "pending" => print_json(&commands::list_pending_items(state, optional_arg(args, 1))?),
    "delete-pending" => {
      let id = require_arg(args, 1, "id")?
        .parse::<i64>()
        .map_err(|_| AppError::new("USAGE", "id must be an integer"))?;
      print_json(&commands::delete_pending_item(state, id, None)?)
    }
    "take-pending" => {
      let name = require_arg(args, 1, "name")?.to_string();
      print_json(&commands::take_pending_items(state, name, None)?)
    }
    "activity" => {
      let customer = optional_arg(args, 1);
      let page = int_arg(args, 2, 1);
      let page_size = int_arg(args, 3, 50);
      print_json(&commands::list_activity(state, customer, page, page_size)?)
    }
    "export-csv" => {
      let year = year_arg(args, 1)?;
      let path = commands::export_invoices_csv(state, year, None, None)?;
      println!("{path}");
      Ok(())
    }
    "export-memo" => {
      let serial = require_arg(args, 1, "serial")?.to_string();
      let include_previous_due = matches!(args.get(2).map(String::as_str), Some("previous-due"));
      let request = MemoExportRequest {
        serial,
        include_previous_due,
        output_path: None,
        actor: None,
      };
      let path = commands::export_memo_excel(state, request)?;
      println!("{path}");
      Ok(())
    }
    "export-register" => {
      let request = RegisterExportRequest {
        year: year_arg(args, 1)?,
        output_path: None,
        actor: None,
      };
      let path = commands::export_register_excel(state, request)?;
      println!("{path}");
      Ok(())
    }
    "open" => {
      let path = require_arg(args, 1, "path")?.to_string();
      commands::open_export(state, path, None)
    }
    "backup" => {
      let request = BackupRequest {
        include_exports: true,
        output_path: optional_arg(args, 1),
        actor: None,
      };
      let path = commands::create_backup(state, request)?;
      println!("{path}");
      Ok(())
    }
    "restore" => {
      let archive_path = require_arg(args, 1, "archive")?.to_string();
      commands::restore_backup(
        state,
        RestoreRequest {
          archive_path,
          actor: None,
        },
      )
    }
    "seed" => {
      let count = args.get(1).and_then(|value| value.parse::<i64>().ok()).unwrap_or(25);
      print_json(&commands::seed_demo_data(state, count, None)?)
    }
    "clear-demo" => print_json(&commands::clear_demo_data(state, None)?),
    other => {
      eprintln!("Unknown command: {other}");
      println!("{USAGE}");
      std::process::exit(2)
    }
  }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

fn require_arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, AppError> {
  args
    .get(index)
    .map(String::as_str)
    .ok_or_else(|| AppError::new("USAGE", format!("Missing argument: {name}")))
}

fn optional_arg(args: &[String], index: usize) -> Option<String> {
  args
    .get(index)
    .map(|value| value.trim().to_string())
    .filter(|value| !value.is_empty())
}

fn parse_json_arg<T: DeserializeOwned>(args: &[String], index: usize, name: &str) -> Result<T, AppError> {
  let raw = require_arg(args, index, name)?;
  Ok(serde_json::from_str(raw)?)
}

fn int_arg(args: &[String], index: usize, default: i64) -> i64 {
  args.get(index).and_then(|value| value.parse().ok()).unwrap_or(default)
}

fn year_arg(args: &[String], index: usize) -> Result<Option<i32>, AppError> {
  match args.get(index) {
    Some(raw) => raw
      .parse::<i32>()
      .map(Some)
      .map_err(|_| AppError::new("USAGE", "year must be a number")),
    None => Ok(None),
  }
}
