//! Process-wide tracker handle.
//!
//! The first successful [`shared`] call opens the database and runs the schema
//! migration; every later call gets the same handle. There is no teardown.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::OnceCell;
use tracing::debug;

use crate::error::{Error, Result};
use crate::service::Tracker;

static TRACKER: OnceCell<Mutex<Tracker>> = OnceCell::new();

/// Get the shared tracker, opening it at `path` on first use.
///
/// `path` is ignored once the handle exists. A failed open leaves the cell
/// empty, so a later call can try again.
pub fn shared(path: &Path) -> Result<&'static Mutex<Tracker>> {
    TRACKER.get_or_try_init(|| {
        debug!(path = %path.display(), "initializing shared tracker");
        Tracker::open_system(path).map(Mutex::new)
    })
}

pub fn lock(handle: &Mutex<Tracker>) -> Result<MutexGuard<'_, Tracker>> {
    handle
        .lock()
        .map_err(|_| Error::StorageCorrupt("tracker lock poisoned".to_string()))
}
