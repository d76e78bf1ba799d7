const UNITS: [&str; 10] = [
  "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
];
const TEENS: [&str; 10] = [
  "Ten",
  "Eleven",
  "Twelve",
  "Thirteen",
  "Fourteen",
  "Fifteen",
  "Sixteen",
  "Seventeen",
  "Eighteen",
  "Nineteen",
];
const TENS: [&str; 10] = [
  "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
];

/// Spells a number below one crore. Teens are irregular and handled as their
/// own band; hundreds join the remainder with "and"; thousand and lakh
/// segments recurse so crore quotients above 999 still spell out.
fn segment_words(n: u64) -> String {
  if n < 10 {
    UNITS[n as usize].to_string()
  } else if n < 20 {
    TEENS[(n - 10) as usize].to_string()
  } else if n < 100 {
    let rest = n % 10;
    if rest != 0 {
      format!("{} {}", TENS[(n / 10) as usize], UNITS[rest as usize])
    } else {
      TENS[(n / 10) as usize].to_string()
    }
  } else if n < 1_000 {
    let rest = n % 100;
    if rest != 0 {
      format!("{} Hundred and {}", UNITS[(n / 100) as usize], segment_words(rest))
    } else {
      format!("{} Hundred", UNITS[(n / 100) as usize])
    }
  } else if n < 100_000 {
    let rest = n % 1_000;
    if rest != 0 {
      format!("{} Thousand {}", segment_words(n / 1_000), segment_words(rest))
    } else {
      format!("{} Thousand", segment_words(n / 1_000))
    }
  } else if n < 10_000_000 {
    let rest = n % 100_000;
    if rest != 0 {
      format!("{} Lakh {}", segment_words(n / 100_000), segment_words(rest))
    } else {
      format!("{} Lakh", segment_words(n / 100_000))
    }
  } else {
    n.to_string()
  }
}

/// Renders a currency amount as English words on the South Asian scale
/// (hundred, thousand, lakh, crore) with a Paisa clause for the fraction.
/// The amount is rounded to two decimal places first; zero renders as
/// "Zero Only.".
pub fn amount_in_words(amount: f64) -> String {
  if !amount.is_finite() || amount <= 0.0 {
    return "Zero Only.".to_string();
  }

  let cents = (amount * 100.0).round() as u64;
  let mut n = cents / 100;
  let fraction = cents % 100;

  let mut words = String::new();
  if n >= 10_000_000 {
    words.push_str(&segment_words(n / 10_000_000));
    words.push_str(" Crore ");
    n %= 10_000_000;
  }
  if n >= 100_000 {
    words.push_str(&segment_words(n / 100_000));
    words.push_str(" Lakh ");
    n %= 100_000;
  }
  if n >= 1_000 {
    words.push_str(&segment_words(n / 1_000));
    words.push_str(" Thousand ");
    n %= 1_000;
  }
  if n > 0 {
    words.push_str(&segment_words(n));
  }

  let mut words = words.trim().to_string();
  if fraction > 0 {
    let paisa = segment_words(fraction);
    if words.is_empty() {
      words = format!("{paisa} Paisa");
    } else {
      words = format!("{words} and {paisa} Paisa");
    }
  }

  if words.is_empty() {
    "Zero Only.".to_string()
  } else {
    format!("{words} Taka Only.")
  }
}
