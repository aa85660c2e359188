//! duskglow entry point: argument dispatch and fatal error reporting.
//!
//! All application logic lives in the library; see [`duskglow::Duskglow`].

use std::path::Path;

use duskglow::args::{CliAction, ParsedArgs, display_help, display_version_info};
use duskglow::constants::EXIT_FAILURE;
use duskglow::logger::Log;
use duskglow::{Duskglow, log_error_exit};

fn main() {
    match ParsedArgs::from_env().action {
        CliAction::ShowHelp => display_help(),
        CliAction::ShowVersion => display_version_info(),
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run(options) => {
            let log_guard = match options.logfile.as_deref() {
                None | Some("-") => None,
                Some(path) => match Log::start_file_logging(Path::new(path)) {
                    Ok(guard) => Some(guard),
                    Err(e) => {
                        log_error_exit!("{e:#}");
                        std::process::exit(EXIT_FAILURE);
                    }
                },
            };

            let result = Duskglow::new(options).run();
            if let Err(e) = result {
                log_error_exit!("{e:#}");
                // process::exit skips destructors; flush the log file first
                drop(log_guard);
                std::process::exit(EXIT_FAILURE);
            }
        }
    }
}
