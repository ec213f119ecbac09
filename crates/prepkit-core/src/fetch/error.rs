//! Fetch error types.
//!
//! Per-source failures are an internal signal driving mirror rotation and are
//! never surfaced directly; only request-shape problems and total exhaustion
//! reach the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Terminal fetch failure. The destination file does not exist when this is
/// returned; retrying with the same request will not help.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request carried no sources at all. Rejected before any I/O.
    #[error("no download sources provided for {}", destination.display())]
    NoSources { destination: PathBuf },

    /// Destination parent directory could not be created.
    #[error("failed to prepare destination {}", destination.display())]
    Prepare {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every source failed; see the log for per-source diagnostics.
    #[error("all download sources failed for {}", destination.display())]
    Exhausted { destination: PathBuf },
}

/// Failure of a single source attempt (curl failure, HTTP error, short body,
/// or disk write failure). Classified here so the fallback loop can log one
/// consistent diagnostic before rotating to the next source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// libcurl reported an error (connect failure, timeout, aborted transfer).
    #[error("{0}")]
    Curl(#[from] curl::Error),

    /// Response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),

    /// Body ended before the declared Content-Length was reached
    /// (e.g. server closed early). Detected so a truncated file is never
    /// mistaken for a completed download.
    #[error("partial transfer: expected {expected} bytes, got {received}")]
    PartialTransfer { expected: u64, received: u64 },

    /// Disk write failed (disk full, permission denied). Not recoverable by
    /// trying another mirror, but rotation is harmless and keeps the loop simple.
    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),
}
