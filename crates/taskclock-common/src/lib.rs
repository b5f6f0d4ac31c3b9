pub mod config;
pub mod date_key;
pub mod error;
pub mod keys;
pub mod types;

pub use date_key::{date_key, date_key_for, today_key, week_dates, week_keys};
pub use error::{Error, Result};
pub use types::*;
