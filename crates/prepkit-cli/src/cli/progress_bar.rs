//! Console progress bar: 50-slot bar with percentage and average rate,
//! refreshed in place with a carriage return.

use std::io::{self, Write};

use prepkit_core::progress::{ProgressSink, ProgressUpdate};

pub struct ConsoleBar {
    drew_anything: bool,
}

impl ConsoleBar {
    pub fn new() -> Self {
        Self {
            drew_anything: false,
        }
    }

    /// Moves the cursor past the bar once the operation is done.
    pub fn finish(&mut self) {
        if self.drew_anything {
            println!();
            self.drew_anything = false;
        }
    }
}

impl ProgressSink for ConsoleBar {
    fn report(&mut self, update: &ProgressUpdate) {
        let filled = ((update.percent / 2.0) as usize).min(50);
        print!(
            "\r[{}{}] {:.2}% ({})     ",
            "█".repeat(filled),
            ".".repeat(50 - filled),
            update.percent,
            update.rate
        );
        let _ = io::stdout().flush();
        self.drew_anything = true;
    }
}

impl Drop for ConsoleBar {
    fn drop(&mut self) {
        self.finish();
    }
}
