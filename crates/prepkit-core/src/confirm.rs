//! Yes/no confirmation capability.
//!
//! The core never reads standard input; callers that want to ask before
//! downloading inject an implementation (the CLI provides a console one).

/// Capability for asking the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Answers yes to everything. For non-interactive callers and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}
