use thiserror::Error;

/// Failures surfaced by the tracker core.
///
/// Input problems are reported before anything is written, so an
/// `InvalidInput` never leaves partial state behind.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied value is out of range; the message says what is expected.
    #[error("{0}")]
    InvalidInput(String),

    /// An update or lookup targeted an entry id that does not exist.
    #[error("Entry {id} not found")]
    NotFound { id: i64 },

    /// The SQLite store could not be opened, read, or written.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    /// Storage failure that did not originate in SQLite itself.
    #[error("Storage unavailable: {0}")]
    StorageCorrupt(String),

    /// The settings row is missing; the schema was not ensured before use.
    #[error("Settings not initialized. Run the schema migration first")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// True for both storage variants.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_) | Self::StorageCorrupt(_))
    }
}
