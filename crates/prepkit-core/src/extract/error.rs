//! Extraction error types.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// Archive path does not exist. Rejected before any I/O.
    #[error("archive not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// Archive could not be opened or parsed (corrupt or not a zip). Entries
    /// written before the failure remain on disk; extraction is idempotent
    /// per entry, so a re-run after re-download picks up where this stopped.
    #[error("unreadable archive {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Filesystem failure while materializing an entry or removing the
    /// archive afterwards.
    #[error("failed writing {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
