use crate::domain::words;
use crate::models::InvoiceItemInput;

#[derive(Debug, Clone)]
pub struct InvoiceTotals {
  pub item_totals: Vec<f64>,
  pub grand_total: f64,
  pub due: f64,
  pub is_paid: bool,
  pub in_words: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentState {
  Paid,
  Partial,
  Unpaid,
}

impl PaymentState {
  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentState::Paid => "PAID",
      PaymentState::Partial => "PARTIAL",
      PaymentState::Unpaid => "UNPAID",
    }
  }
}

/// Line total for one item. Area billing applies only when both
/// dimensions are present and positive, otherwise quantity times rate.
pub fn line_total(quantity: f64, rate: f64, length_ft: Option<f64>, width_ft: Option<f64>) -> f64 {
  match (length_ft, width_ft) {
    (Some(len), Some(wid)) if len > 0.0 && wid > 0.0 => len * wid * quantity * rate,
    _ => quantity * rate,
  }
}

/// A manually entered total (`Some`) wins over the computed one.
pub fn resolve_item_total(item: &InvoiceItemInput) -> f64 {
  item
    .total
    .unwrap_or_else(|| line_total(item.quantity, item.rate, item.length_ft, item.width_ft))
}

/// Recomputes every derived field of an invoice from its items and the
/// advance paid. Due is clamped at zero; a zero-total invoice is never paid;
/// the words render the grand total, not the due.
pub fn recompute_invoice(items: &[InvoiceItemInput], advance: f64) -> InvoiceTotals {
  let item_totals: Vec<f64> = items.iter().map(resolve_item_total).collect();
  let grand_total: f64 = item_totals.iter().sum();
  let (due, is_paid) = settle_payment(grand_total, advance);
  let in_words = words::amount_in_words(grand_total);

  InvoiceTotals {
    item_totals,
    grand_total,
    due,
    is_paid,
    in_words,
  }
}

/// Due clamped at zero and the paid flag, for a given grand total and advance.
pub fn settle_payment(grand_total: f64, advance: f64) -> (f64, bool) {
  let due = (grand_total - advance).max(0.0);
  (due, due <= 0.0 && grand_total > 0.0)
}

pub fn payment_state(grand_total: f64, advance: f64, due: f64) -> Option<PaymentState> {
  if due <= 0.0 && grand_total > 0.0 {
    Some(PaymentState::Paid)
  } else if advance > 0.0 && due > 0.0 {
    Some(PaymentState::Partial)
  } else if due > 0.0 {
    Some(PaymentState::Unpaid)
  } else {
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(quantity: f64, rate: f64) -> InvoiceItemInput {
    InvoiceItemInput {
      details: "Visiting Card".to_string(),
      length_ft: None,
      width_ft: None,
      quantity,
      rate,
      total: None,
    }
  }

  fn banner(quantity: f64, rate: f64, len: f64, wid: f64) -> InvoiceItemInput {
    InvoiceItemInput {
      length_ft: Some(len),
      width_ft: Some(wid),
      ..item(quantity, rate)
    }
  }

  #[test]
  fn line_total_without_dimensions() {
    assert_eq!(line_total(2.0, 500.0, None, None), 1000.0);
    assert_eq!(line_total(3.0, 10.0, Some(0.0), Some(4.0)), 30.0);
    assert_eq!(line_total(3.0, 10.0, Some(8.0), None), 30.0);
  }

  #[test]
  fn line_total_with_area_billing() {
    assert_eq!(line_total(1.0, 25.0, Some(8.0), Some(3.0)), 600.0);
    assert_eq!(line_total(2.0, 25.0, Some(8.0), Some(3.0)), 1200.0);
  }

  #[test]
  fn manual_total_override_is_preserved() {
    let mut overridden = item(2.0, 500.0);
    overridden.total = Some(950.0);
    assert_eq!(resolve_item_total(&overridden), 950.0);

    let totals = recompute_invoice(&[overridden, item(1.0, 50.0)], 0.0);
    assert_eq!(totals.grand_total, 1000.0);
  }

  #[test]
  fn due_is_clamped_at_zero() {
    let totals = recompute_invoice(&[item(1.0, 100.0)], 500.0);
    assert_eq!(totals.due, 0.0);
    assert!(totals.is_paid);
  }

  #[test]
  fn empty_invoice_is_never_paid() {
    let totals = recompute_invoice(&[], 0.0);
    assert_eq!(totals.grand_total, 0.0);
    assert_eq!(totals.due, 0.0);
    assert!(!totals.is_paid);
  }

  #[test]
  fn recompute_scenario_with_advance() {
    let totals = recompute_invoice(&[item(2.0, 500.0)], 300.0);
    assert_eq!(totals.grand_total, 1000.0);
    assert_eq!(totals.due, 700.0);
    assert!(!totals.is_paid);
    assert_eq!(totals.in_words, "One Thousand Taka Only.");
  }

  #[test]
  fn grand_total_sums_mixed_items() {
    let totals = recompute_invoice(&[banner(1.0, 25.0, 8.0, 3.0), item(100.0, 2.0)], 0.0);
    assert_eq!(totals.grand_total, 800.0);
    assert_eq!(totals.item_totals, vec![600.0, 200.0]);
  }

  #[test]
  fn payment_state_classification() {
    assert_eq!(payment_state(1000.0, 1000.0, 0.0), Some(PaymentState::Paid));
    assert_eq!(payment_state(1000.0, 300.0, 700.0), Some(PaymentState::Partial));
    assert_eq!(payment_state(1000.0, 0.0, 1000.0), Some(PaymentState::Unpaid));
    assert_eq!(payment_state(0.0, 0.0, 0.0), None);
  }
}
