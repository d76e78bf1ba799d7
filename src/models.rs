use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
  pub shop_name: String,
  pub proprietor: String,
  pub mobile: String,
  pub address: String,
  pub serial_floor: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum LedgerKind {
  Deposit,
  Due,
}

impl LedgerKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      LedgerKind::Deposit => "Deposit",
      LedgerKind::Due => "Due",
    }
  }

  pub fn parse(value: &str) -> Option<Self> {
    match value {
      "Deposit" => Some(LedgerKind::Deposit),
      "Due" => Some(LedgerKind::Due),
      _ => None,
    }
  }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvoiceItem {
  pub id: i64,
  pub details: String,
  pub length_ft: Option<f64>,
  pub width_ft: Option<f64>,
  pub quantity: f64,
  pub rate: f64,
  pub total: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvoiceItemInput {
  pub details: String,
  pub length_ft: Option<f64>,
  pub width_ft: Option<f64>,
  pub quantity: f64,
  pub rate: f64,
  pub total: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvoiceInput {
  pub serial: Option<String>,
  pub customer_name: String,
  pub customer_address: Option<String>,
  pub customer_mobile: Option<String>,
  pub memo_date: String,
  pub advance: f64,
  pub is_walk_in: bool,
  pub items: Vec<InvoiceItemInput>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvoiceRecord {
  pub id: i64,
  pub serial: String,
  pub customer_name: String,
  pub customer_address: Option<String>,
  pub customer_mobile: Option<String>,
  pub memo_date: String,
  pub grand_total: f64,
  pub advance: f64,
  pub due: f64,
  pub is_paid: bool,
  pub is_walk_in: bool,
  pub in_words: String,
  pub items: Vec<InvoiceItem>,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct InvoiceSummary {
  pub id: i64,
  pub serial: String,
  pub customer_name: String,
  pub customer_mobile: Option<String>,
  pub memo_date: String,
  pub grand_total: f64,
  pub advance: f64,
  pub due: f64,
  pub is_paid: bool,
  pub is_walk_in: bool,
  pub item_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InvoiceFilter {
  pub search: Option<String>,
  pub status: Option<String>,
  pub page: i64,
  pub page_size: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Customer {
  pub id: i64,
  pub name: String,
  pub address: Option<String>,
  pub mobile: Option<String>,
  pub opening_balance: f64,
  pub created_at: String,
  pub updated_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerInput {
  pub name: String,
  pub address: Option<String>,
  pub mobile: Option<String>,
  pub opening_balance: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CustomerOverview {
  pub id: i64,
  pub name: String,
  pub address: Option<String>,
  pub mobile: Option<String>,
  pub opening_balance: f64,
  pub invoice_count: i64,
  pub total_billed: f64,
  pub total_due: f64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerEntry {
  pub id: i64,
  pub customer_name: String,
  pub entry_date: String,
  pub description: String,
  pub amount: f64,
  pub kind: LedgerKind,
  pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerEntryInput {
  pub customer_name: String,
  pub entry_date: String,
  pub description: String,
  pub amount: f64,
  pub kind: LedgerKind,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PendingItem {
  pub id: i64,
  pub customer_name: String,
  pub details: String,
  pub quantity: f64,
  pub rate: f64,
  pub total: f64,
  pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PendingItemInput {
  pub customer_name: String,
  pub details: String,
  pub quantity: f64,
  pub rate: f64,
  pub total: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActivityEntry {
  pub id: i64,
  pub customer_name: String,
  pub entry_date: String,
  pub category: String,
  pub description: String,
  pub amount: f64,
  pub actor: Option<String>,
  pub created_at: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerStatement {
  pub customer: Option<Customer>,
  pub invoices: Vec<InvoiceSummary>,
  pub ledger: Vec<LedgerEntry>,
  pub pending: Vec<PendingItem>,
  pub activity: Vec<ActivityEntry>,
  pub outstanding_due: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardStats {
  pub invoice_count: i64,
  pub paid_count: i64,
  pub partial_count: i64,
  pub unpaid_count: i64,
  pub total_revenue: f64,
  pub pending_revenue: f64,
  pub customer_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T> {
  pub total: i64,
  pub items: Vec<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemoExportRequest {
  pub serial: String,
  pub include_previous_due: bool,
  pub output_path: Option<String>,
  pub actor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterExportRequest {
  pub year: Option<i32>,
  pub output_path: Option<String>,
  pub actor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupRequest {
  pub include_exports: bool,
  pub output_path: Option<String>,
  pub actor: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RestoreRequest {
  pub archive_path: String,
  pub actor: Option<String>,
}
