//! Progress reporting shared by fetch and extract (percent done, elapsed, rate).
//!
//! Both components emit [`ProgressUpdate`] values through a [`ProgressSink`]
//! at chunk/entry granularity; rendering (console bar, log line) belongs to
//! the caller.

use std::time::Instant;

/// One progress observation for a transfer or extraction in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Percent complete in [0.0, 100.0]. Clamped; the final observation of a
    /// successful operation is exactly 100.
    pub percent: f64,
    /// Elapsed time since the operation started (seconds).
    pub elapsed_secs: f64,
    /// Human-readable average rate, e.g. "812.40 KB/s" or "3.10 MB/s".
    pub rate: String,
}

/// Consumer of progress observations.
pub trait ProgressSink {
    fn report(&mut self, update: &ProgressUpdate);
}

impl<F: FnMut(&ProgressUpdate)> ProgressSink for F {
    fn report(&mut self, update: &ProgressUpdate) {
        self(update)
    }
}

/// Formats an average rate over `elapsed_secs` as KB/s, switching to MB/s
/// above 1024 KB/s. Zero elapsed time reports 0.00 KB/s rather than dividing.
pub fn rate_label(bytes_done: u64, elapsed_secs: f64) -> String {
    let kb_per_sec = if elapsed_secs > 0.0 {
        (bytes_done as f64 / 1024.0) / elapsed_secs
    } else {
        0.0
    };
    if kb_per_sec > 1024.0 {
        format!("{:.2} MB/s", kb_per_sec / 1024.0)
    } else {
        format!("{:.2} KB/s", kb_per_sec)
    }
}

/// Tracks completed bytes against a (possibly shrinking) total and produces
/// clamped progress snapshots.
///
/// The extractor shrinks the total as it discovers entries that already exist
/// on disk, so the denominator only counts work actually performed.
#[derive(Debug)]
pub struct ProgressTracker {
    total: u64,
    done: u64,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: u64) -> Self {
        Self {
            total,
            done: 0,
            started: Instant::now(),
        }
    }

    /// Records `bytes` of completed work.
    pub fn add(&mut self, bytes: u64) {
        self.done += bytes;
    }

    /// Removes `bytes` of already-materialized work from the denominator.
    pub fn discount(&mut self, bytes: u64) {
        self.total = self.total.saturating_sub(bytes);
    }

    pub fn done(&self) -> u64 {
        self.done
    }

    /// Current observation. A zero total reports 100 immediately (all work
    /// either absent or already present).
    pub fn snapshot(&self) -> ProgressUpdate {
        let percent = if self.total == 0 {
            100.0
        } else {
            (self.done as f64 / self.total as f64 * 100.0).min(100.0)
        };
        let elapsed_secs = self.started.elapsed().as_secs_f64();
        ProgressUpdate {
            percent,
            elapsed_secs,
            rate: rate_label(self.done, elapsed_secs),
        }
    }
}
