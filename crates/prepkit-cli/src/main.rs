use prepkit_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Log to a file so the console progress bar stays intact; fall back to
    // stderr if the state dir is unusable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("prepkit error: {:#}", err);
        std::process::exit(1);
    }
}
