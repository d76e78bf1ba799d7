pub mod backup;
pub mod exports;
