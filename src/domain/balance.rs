use crate::models::{InvoiceSummary, LedgerEntry, LedgerKind};

/// Free-text customer entry drifts in casing and spacing; every aggregation
/// compares normalized names while the stored natural key stays raw.
pub fn normalize_name(name: &str) -> String {
  name.trim().to_lowercase()
}

/// Outstanding balance for one customer: the due of every matching invoice
/// (minus the one being edited, when given) plus manual Due entries, minus
/// Deposits. A customer with no history nets to zero; a negative result is
/// credit on file.
pub fn outstanding_due(
  name: &str,
  invoices: &[InvoiceSummary],
  ledger: &[LedgerEntry],
  exclude_serial: Option<&str>,
) -> f64 {
  let wanted = normalize_name(name);

  let invoice_due: f64 = invoices
    .iter()
    .filter(|invoice| normalize_name(&invoice.customer_name) == wanted)
    .filter(|invoice| exclude_serial != Some(invoice.serial.as_str()))
    .map(|invoice| invoice.due)
    .sum();

  let ledger_net: f64 = ledger
    .iter()
    .filter(|entry| normalize_name(&entry.customer_name) == wanted)
    .map(|entry| match entry.kind {
      LedgerKind::Due => entry.amount,
      LedgerKind::Deposit => -entry.amount,
    })
    .sum();

  invoice_due + ledger_net
}
