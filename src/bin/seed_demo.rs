use std::path::PathBuf;

use master_press_khata::commands;
use master_press_khata::AppState;

fn main() -> Result<(), Box<dyn std::error::Error>> {
  let count = std::env::args()
    .nth(1)
    .and_then(|value| value.parse::<i64>().ok())
    .unwrap_or(25);

  let state = if let Ok(path) = std::env::var("MASTER_PRESS_SEED_DIR") {
    AppState::open_at(PathBuf::from(path))?
  } else {
    AppState::open()?
  };

  let created = commands::seed_demo_data(&state, count, Some("seed-demo".to_string()))?;

  println!("Seeded {} demo memos in {}", created, state.app_dir.display());
  Ok(())
}
