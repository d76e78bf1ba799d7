pub const DEFAULT_SERIAL_FLOOR: i64 = 10_000;

/// Derives the next invoice serial: the maximum of all numeric serials and
/// the floor, plus one. Non-numeric serials are ignored, so the first serial
/// issued over the default floor is "10001".
pub fn next_serial<'a>(existing: impl IntoIterator<Item = &'a str>, floor: i64) -> String {
  let max = existing
    .into_iter()
    .filter_map(|serial| serial.trim().parse::<i64>().ok())
    .fold(floor, i64::max);
  (max + 1).to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn next_after_existing_serials() {
    let serials = ["10001", "10002", "abc"];
    assert_eq!(next_serial(serials, DEFAULT_SERIAL_FLOOR), "10003");
  }

  #[test]
  fn first_serial_starts_above_floor() {
    assert_eq!(next_serial([], DEFAULT_SERIAL_FLOOR), "10001");
  }

  #[test]
  fn serials_below_floor_do_not_regress() {
    assert_eq!(next_serial(["9000"], DEFAULT_SERIAL_FLOOR), "10001");
  }

  #[test]
  fn whitespace_is_trimmed_before_parsing() {
    assert_eq!(next_serial([" 10005 ", "x"], DEFAULT_SERIAL_FLOOR), "10006");
  }
}
