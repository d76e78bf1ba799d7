use rusqlite::{params, Connection};

use crate::domain::serial::DEFAULT_SERIAL_FLOOR;
use crate::error::AppError;
use crate::models::Settings;

const KEY_SHOP_NAME: &str = "shop_name";
const KEY_PROPRIETOR: &str = "proprietor";
const KEY_MOBILE: &str = "mobile";
const KEY_ADDRESS: &str = "address";
const KEY_SERIAL_FLOOR: &str = "serial_floor";

pub fn ensure_defaults(conn: &Connection) -> Result<(), AppError> {
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_SHOP_NAME, "Master Computer & Printing Press"],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_PROPRIETOR, ""],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_MOBILE, ""],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_ADDRESS, ""],
  )?;
  conn.execute(
    "INSERT OR IGNORE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_SERIAL_FLOOR, DEFAULT_SERIAL_FLOOR.to_string()],
  )?;
  Ok(())
}

pub fn get_settings(conn: &Connection) -> Result<Settings, AppError> {
  let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
  let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

  let mut shop_name = "Master Computer & Printing Press".to_string();
  let mut proprietor = String::new();
  let mut mobile = String::new();
  let mut address = String::new();
  let mut serial_floor = DEFAULT_SERIAL_FLOOR;

  for row in rows {
    let (key, value) = row?;
    match key.as_str() {
      KEY_SHOP_NAME => {
        shop_name = value;
      }
      KEY_PROPRIETOR => {
        proprietor = value;
      }
      KEY_MOBILE => {
        mobile = value;
      }
      KEY_ADDRESS => {
        address = value;
      }
      KEY_SERIAL_FLOOR => {
        serial_floor = value.parse().unwrap_or(serial_floor);
      }
      _ => {}
    }
  }

  Ok(Settings {
    shop_name,
    proprietor,
    mobile,
    address,
    serial_floor,
  })
}

pub fn update_settings(conn: &Connection, settings: &Settings) -> Result<(), AppError> {
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_SHOP_NAME, settings.shop_name.clone()],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_PROPRIETOR, settings.proprietor.clone()],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_MOBILE, settings.mobile.clone()],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_ADDRESS, settings.address.clone()],
  )?;
  conn.execute(
    "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
    params![KEY_SERIAL_FLOOR, settings.serial_floor.to_string()],
  )?;
  Ok(())
}
