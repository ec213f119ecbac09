//! Resilient download with mirror fallback.
//!
//! Tries an ordered list of source URLs until one yields the destination
//! file. A source that fails (connect error, bad status, short body) cleans
//! up its partial write and the next source is tried; the caller only sees
//! an error once every source is exhausted. A destination that already
//! exists is a success with no network activity, so bootstrap scripts can be
//! re-run freely.

mod error;
mod single;

pub use error::{FetchError, SourceError};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::PrepkitConfig;
use crate::progress::ProgressSink;

/// One download: where to get it (in preference order) and where to put it.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    sources: Vec<String>,
    destination: PathBuf,
    headers: HashMap<String, String>,
}

impl FetchRequest {
    /// Builds a request from an ordered list of alternative sources.
    /// Fails fast if `sources` is empty; no I/O has happened at that point.
    pub fn new(
        sources: Vec<String>,
        destination: impl Into<PathBuf>,
    ) -> Result<Self, FetchError> {
        let destination = destination.into();
        if sources.is_empty() {
            return Err(FetchError::NoSources { destination });
        }
        Ok(Self {
            sources,
            destination,
            headers: HashMap::new(),
        })
    }

    /// Convenience for the common single-URL case.
    pub fn single(url: impl Into<String>, destination: impl Into<PathBuf>) -> Self {
        Self {
            sources: vec![url.into()],
            destination: destination.into(),
            headers: HashMap::new(),
        }
    }

    /// Adds transport headers sent with every source attempt.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// How a successful fetch concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Destination already existed as a regular file; nothing was transferred.
    AlreadyPresent,
    /// Downloaded `bytes` from `source` (one of the request's URLs).
    Downloaded { source: String, bytes: u64 },
}

/// Fetches a resource, rotating through the request's sources in order.
///
/// On success exactly one file exists at the destination. On
/// [`FetchError::Exhausted`] no file is left behind; each failed attempt
/// removes its own partial write before the next source is tried.
pub fn fetch(
    request: &FetchRequest,
    cfg: &PrepkitConfig,
    sink: &mut dyn ProgressSink,
) -> Result<FetchOutcome, FetchError> {
    let destination = request.destination();

    if destination.is_file() {
        tracing::info!(
            "skipping download, {} already exists",
            destination.display()
        );
        return Ok(FetchOutcome::AlreadyPresent);
    }

    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent).map_err(|source| FetchError::Prepare {
            destination: destination.to_path_buf(),
            source,
        })?;
    }

    let last = request.sources().len() - 1;
    for (i, url) in request.sources().iter().enumerate() {
        tracing::info!("downloading {} to {}", url, destination.display());
        match single::download_source(url, &request.headers, destination, cfg, sink) {
            Ok(bytes) => {
                tracing::info!("downloaded {} bytes from {}", bytes, url);
                return Ok(FetchOutcome::Downloaded {
                    source: url.clone(),
                    bytes,
                });
            }
            Err(e) => {
                discard_partial(destination);
                if i < last {
                    tracing::warn!("download from {} failed: {}; trying next source", url, e);
                } else {
                    tracing::warn!("download from {} failed: {}", url, e);
                }
            }
        }
    }

    Err(FetchError::Exhausted {
        destination: destination.to_path_buf(),
    })
}

/// Removes whatever a failed attempt left at `destination`, so the next
/// source starts clean and an overall failure leaves no file behind.
fn discard_partial(destination: &Path) {
    if destination.exists() {
        if let Err(e) = fs::remove_file(destination) {
            tracing::warn!(
                "failed to remove partial file {}: {}",
                destination.display(),
                e
            );
        }
    }
}
