use gatelink_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // File under the XDG state dir, or stderr; never fatal.
    logging::init_logging();

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("gatelink error: {:#}", err);
        std::process::exit(1);
    }
}
