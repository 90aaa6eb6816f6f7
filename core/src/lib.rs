//! Storage and aggregation for a daily protein log.
//!
//! A single SQLite file holds one settings row (the daily protein goal) and
//! the dated food entries. [`service::Tracker`] is the API a front end calls;
//! [`store`] keeps one process-wide instance of it.

pub mod clock;
pub mod db;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use service::Tracker;
