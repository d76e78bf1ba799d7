pub mod balance;
pub mod serial;
pub mod totals;
pub mod validation;
pub mod words;
