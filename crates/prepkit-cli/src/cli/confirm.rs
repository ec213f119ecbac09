//! Console yes/no prompt.

use std::io::{self, Write};

use prepkit_core::confirm::Confirm;

/// Asks on stdout and reads the answer from stdin. Re-asks until the first
/// character of the reply is 'y' or 'n'.
#[derive(Debug, Default)]
pub struct ConsoleConfirm;

impl Confirm for ConsoleConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        loop {
            print!("{} [Y/N]: ", prompt);
            let _ = io::stdout().flush();

            let mut reply = String::new();
            if io::stdin().read_line(&mut reply).is_err() {
                return false;
            }
            match reply.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
                Some('y') => return true,
                Some('n') => return false,
                _ => continue,
            }
        }
    }
}
