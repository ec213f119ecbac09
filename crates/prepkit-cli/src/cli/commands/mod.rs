mod extract;
mod fetch;

pub use extract::run_extract;
pub use fetch::run_fetch;
