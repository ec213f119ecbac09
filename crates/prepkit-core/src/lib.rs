pub mod config;
pub mod logging;

pub mod confirm;
pub mod extract;
pub mod fetch;
pub mod progress;
pub mod url_model;
