use clap::Parser;
use fetchsum_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if logging::init_logging(cli.log_file.as_deref()).is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = cli.run() {
        eprintln!("fetchsum error: {:#}", err);
        std::process::exit(1);
    }
}
