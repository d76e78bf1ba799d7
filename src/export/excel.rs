use std::path::Path;

use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{Color, ExcelDateTime, Format, FormatAlign, Workbook, Worksheet};

use crate::domain::totals;
use crate::error::AppError;
use crate::models::{CustomerOverview, DashboardStats, InvoiceRecord, InvoiceSummary, Settings};

pub fn export_memo(
  shop: &Settings,
  invoice: &InvoiceRecord,
  previous_due: Option<f64>,
  path: &Path,
) -> Result<(), AppError> {
  let mut workbook = Workbook::new();
  write_memo_sheet(&mut workbook, shop, invoice, previous_due)?;
  workbook
    .save(path)
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;
  Ok(())
}

pub fn export_register(
  shop: &Settings,
  stats: &DashboardStats,
  rows: &[InvoiceSummary],
  rollups: &[CustomerOverview],
  path: &Path,
) -> Result<(), AppError> {
  let mut workbook = Workbook::new();
  write_summary_sheet(&mut workbook, shop, stats)?;
  write_register_sheet(&mut workbook, rows)?;
  write_customer_sheet(&mut workbook, rollups)?;
  workbook
    .save(path)
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;
  Ok(())
}

fn write_memo_sheet(
  workbook: &mut Workbook,
  shop: &Settings,
  invoice: &InvoiceRecord,
  previous_due: Option<f64>,
) -> Result<(), AppError> {
  let mut sheet = workbook.add_worksheet();
  sheet
    .set_name("MEMO")
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let banner = Format::new()
    .set_bold()
    .set_font_size(16.0)
    .set_font_color(Color::White)
    .set_background_color(Color::RGB(0x1A2433))
    .set_align(FormatAlign::Center);
  let center = Format::new().set_align(FormatAlign::Center);
  let label = Format::new().set_bold();
  let header = Format::new()
    .set_bold()
    .set_background_color(Color::RGB(0xE2E8F0))
    .set_align(FormatAlign::Center);
  let money = Format::new().set_num_format("#,##0.00");
  let date_format = Format::new().set_num_format("dd/mm/yyyy");

  sheet.merge_range(0, 0, 0, 5, &shop.shop_name, &banner)?;
  let mut row = 1;
  if !shop.proprietor.trim().is_empty() {
    sheet.merge_range(row, 0, row, 5, &format!("Proprietor: {}", shop.proprietor), &center)?;
    row += 1;
  }
  if !shop.address.trim().is_empty() {
    sheet.merge_range(row, 0, row, 5, &shop.address, &center)?;
    row += 1;
  }
  if !shop.mobile.trim().is_empty() {
    sheet.merge_range(row, 0, row, 5, &format!("Mobile: {}", shop.mobile), &center)?;
    row += 1;
  }

  row += 1;
  sheet.write_string_with_format(row, 0, "Memo No", &label)?;
  sheet.write_string(row, 1, &invoice.serial)?;
  sheet.write_string_with_format(row, 3, "Date", &label)?;
  write_date(&mut sheet, row, 4, &invoice.memo_date, &date_format)?;
  row += 1;
  sheet.write_string_with_format(row, 0, "Customer", &label)?;
  sheet.write_string(row, 1, &invoice.customer_name)?;
  row += 1;
  sheet.write_string_with_format(row, 0, "Address", &label)?;
  sheet.write_string(row, 1, invoice.customer_address.as_deref().unwrap_or(""))?;
  row += 1;
  sheet.write_string_with_format(row, 0, "Mobile", &label)?;
  sheet.write_string(row, 1, invoice.customer_mobile.as_deref().unwrap_or(""))?;
  row += 2;

  let item_headers = ["SL", "Item Details", "Size", "Qty", "Rate", "Total"];
  for (idx, text) in item_headers.iter().enumerate() {
    sheet.write_string_with_format(row, idx as u16, *text, &header)?;
  }
  row += 1;

  for (idx, item) in invoice.items.iter().enumerate() {
    sheet.write_number(row, 0, (idx + 1) as f64)?;
    sheet.write_string(row, 1, &item.details)?;
    sheet.write_string_with_format(row, 2, &size_label(item.length_ft, item.width_ft), &center)?;
    sheet.write_number(row, 3, item.quantity)?;
    sheet.write_number_with_format(row, 4, item.rate, &money)?;
    sheet.write_number_with_format(row, 5, item.total, &money)?;
    row += 1;
  }

  row += 1;
  sheet.write_string_with_format(row, 4, "Grand Total", &label)?;
  sheet.write_number_with_format(row, 5, invoice.grand_total, &money)?;
  row += 1;
  sheet.write_string_with_format(row, 4, "Advance", &label)?;
  sheet.write_number_with_format(row, 5, invoice.advance, &money)?;
  row += 1;
  sheet.write_string_with_format(row, 4, "Due", &label)?;
  sheet.write_number_with_format(row, 5, invoice.due, &money)?;
  row += 1;
  if let Some(previous) = previous_due {
    sheet.write_string_with_format(row, 4, "Previous Due", &label)?;
    sheet.write_number_with_format(row, 5, previous, &money)?;
    row += 1;
    sheet.write_string_with_format(row, 4, "Net Payable", &label)?;
    sheet.write_number_with_format(row, 5, invoice.due + previous, &money)?;
    row += 1;
  }

  row += 1;
  sheet.write_string_with_format(row, 0, "In Words", &label)?;
  sheet.write_string(row, 1, &invoice.in_words)?;

  row += 3;
  sheet.write_string_with_format(row, 0, "Customer Signature", &center)?;
  sheet.write_string_with_format(row, 4, "Authorised Signature", &center)?;

  sheet.set_column_width(0, 6)?;
  sheet.set_column_width(1, 36)?;
  sheet.set_column_width(2, 14)?;
  sheet.set_column_width(3, 8)?;
  sheet.set_column_width(4, 14)?;
  sheet.set_column_width(5, 14)?;
  Ok(())
}

fn write_summary_sheet(
  workbook: &mut Workbook,
  shop: &Settings,
  stats: &DashboardStats,
) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet
    .set_name("SUMMARY")
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let header = Format::new()
    .set_bold()
    .set_font_color(Color::White)
    .set_background_color(Color::RGB(0x1A2433));
  let label = Format::new().set_bold();
  let money = Format::new().set_num_format("#,##0.00");
  let count = Format::new().set_num_format("#,##0");

  sheet.merge_range(0, 0, 0, 3, &format!("{} Invoice Register", shop.shop_name), &header)?;

  let rows = vec![
    ("Total Memos", stats.invoice_count as f64),
    ("Paid Memos", stats.paid_count as f64),
    ("Partially Paid Memos", stats.partial_count as f64),
    ("Unpaid Memos", stats.unpaid_count as f64),
    ("Customers", stats.customer_count as f64),
    ("Collected Revenue", stats.total_revenue),
    ("Pending Revenue", stats.pending_revenue),
  ];

  let mut row = 2;
  for (label_text, value) in rows {
    sheet.write_string_with_format(row, 0, label_text, &label)?;
    if label_text.ends_with("Revenue") {
      sheet.write_number_with_format(row, 1, value, &money)?;
    } else {
      sheet.write_number_with_format(row, 1, value, &count)?;
    }
    row += 1;
  }

  sheet.set_column_width(0, 28)?;
  sheet.set_column_width(1, 18)?;
  Ok(())
}

fn write_register_sheet(workbook: &mut Workbook, summaries: &[InvoiceSummary]) -> Result<(), AppError> {
  let mut sheet = workbook.add_worksheet();
  sheet
    .set_name("REGISTER")
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let header = Format::new()
    .set_bold()
    .set_background_color(Color::RGB(0xE2E8F0))
    .set_align(FormatAlign::Center);
  let title = Format::new().set_bold().set_font_size(14.0);
  let money = Format::new().set_num_format("#,##0.00");
  let date_format = Format::new().set_num_format("dd/mm/yyyy");

  sheet.write_string_with_format(0, 0, "Invoice Register", &title)?;

  let headers = [
    "Serial",
    "Date",
    "Customer",
    "Mobile",
    "Items",
    "Grand Total",
    "Advance",
    "Due",
    "Status",
    "Walk-in",
  ];
  for (idx, text) in headers.iter().enumerate() {
    sheet.write_string_with_format(2, idx as u16, *text, &header)?;
  }

  let mut row = 3;
  for summary in summaries {
    sheet.write_string(row, 0, &summary.serial)?;
    write_date(&mut sheet, row, 1, &summary.memo_date, &date_format)?;
    sheet.write_string(row, 2, &summary.customer_name)?;
    sheet.write_string(row, 3, summary.customer_mobile.as_deref().unwrap_or(""))?;
    sheet.write_number(row, 4, summary.item_count as f64)?;
    sheet.write_number_with_format(row, 5, summary.grand_total, &money)?;
    sheet.write_number_with_format(row, 6, summary.advance, &money)?;
    sheet.write_number_with_format(row, 7, summary.due, &money)?;
    let status = totals::payment_state(summary.grand_total, summary.advance, summary.due)
      .map(|state| state.as_str())
      .unwrap_or("-");
    sheet.write_string(row, 8, status)?;
    sheet.write_string(row, 9, if summary.is_walk_in { "YES" } else { "" })?;
    row += 1;
  }

  sheet.set_column_width(0, 10)?;
  sheet.set_column_width(1, 12)?;
  sheet.set_column_width(2, 26)?;
  sheet.set_column_width(3, 16)?;
  sheet.set_column_width(4, 8)?;
  sheet.set_column_width(5, 14)?;
  sheet.set_column_width(6, 12)?;
  sheet.set_column_width(7, 12)?;
  sheet.set_column_width(8, 10)?;
  sheet.set_column_width(9, 10)?;

  if row > 3 {
    sheet.autofilter(2, 0, row - 1, 9)?;
  }
  sheet.set_freeze_panes(3, 0)?;
  Ok(())
}

fn write_customer_sheet(workbook: &mut Workbook, rollups: &[CustomerOverview]) -> Result<(), AppError> {
  let sheet = workbook.add_worksheet();
  sheet
    .set_name("CUSTOMERS")
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;

  let header = Format::new()
    .set_bold()
    .set_background_color(Color::RGB(0xE2E8F0))
    .set_align(FormatAlign::Center);
  let title = Format::new().set_bold().set_font_size(14.0);
  let money = Format::new().set_num_format("#,##0.00");

  sheet.write_string_with_format(0, 0, "Customer Balances", &title)?;

  let headers = [
    "Customer",
    "Mobile",
    "Address",
    "Opening Balance",
    "Memos",
    "Total Billed",
    "Total Due",
  ];
  for (idx, text) in headers.iter().enumerate() {
    sheet.write_string_with_format(2, idx as u16, *text, &header)?;
  }

  let mut row = 3;
  for overview in rollups {
    sheet.write_string(row, 0, &overview.name)?;
    sheet.write_string(row, 1, overview.mobile.as_deref().unwrap_or(""))?;
    sheet.write_string(row, 2, overview.address.as_deref().unwrap_or(""))?;
    sheet.write_number_with_format(row, 3, overview.opening_balance, &money)?;
    sheet.write_number(row, 4, overview.invoice_count as f64)?;
    sheet.write_number_with_format(row, 5, overview.total_billed, &money)?;
    sheet.write_number_with_format(row, 6, overview.total_due, &money)?;
    row += 1;
  }

  sheet.set_column_width(0, 26)?;
  sheet.set_column_width(1, 16)?;
  sheet.set_column_width(2, 30)?;
  sheet.set_column_width(3, 14)?;
  sheet.set_column_width(4, 8)?;
  sheet.set_column_width(5, 14)?;
  sheet.set_column_width(6, 14)?;

  if row > 3 {
    sheet.autofilter(2, 0, row - 1, 6)?;
  }
  sheet.set_freeze_panes(3, 0)?;
  Ok(())
}

fn write_date(sheet: &mut Worksheet, row: u32, col: u16, date: &str, format: &Format) -> Result<(), AppError> {
  let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
    .map_err(|_| AppError::new("INVALID_DATE", "Date must be YYYY-MM-DD"))?;
  let year = u16::try_from(parsed.year()).map_err(|_| AppError::new("INVALID_DATE", "Date must be YYYY-MM-DD"))?;
  let date = ExcelDateTime::from_ymd(year, parsed.month() as u8, parsed.day() as u8)
    .map_err(|err| AppError::new("EXPORT", err.to_string()))?;
  sheet.write_datetime_with_format(row, col, &date, format)?;
  Ok(())
}

fn size_label(length_ft: Option<f64>, width_ft: Option<f64>) -> String {
  match (length_ft, width_ft) {
    (Some(length), Some(width)) if length > 0.0 && width > 0.0 => {
      format!("{}' x {}'", trim_feet(length), trim_feet(width))
    }
    _ => "-".to_string(),
  }
}

fn trim_feet(value: f64) -> String {
  if value.fract() == 0.0 {
    format!("{value:.0}")
  } else {
    format!("{value}")
  }
}
