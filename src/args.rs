//! Command-line argument parsing and processing.
//!
//! duskglow has no subcommands: it is a daemon with a handful of flags, and
//! everything else lives in the configuration file. Unknown options lead to
//! the help text and a non-zero exit.

use std::path::PathBuf;

/// Settings for a normal run, collected from flags.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunOptions {
    pub debug_enabled: bool,
    /// Explicit configuration file, bypassing the search order
    pub config_path: Option<PathBuf>,
    /// Log destination; `-` keeps output on stdout
    pub logfile: Option<String>,
    pub pidfile: Option<PathBuf>,
    /// Print the schedule after initialising the device, then exit
    pub test_only: bool,
    /// Fast-forward between two local times instead of running in real time
    pub simulate: Option<(String, String)>,
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon with these settings
    Run(RunOptions),
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown or incomplete arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped. `--help` and
    /// `--version` win over everything else, wherever they appear.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        if args_vec.iter().any(|arg| arg == "--help" || arg == "-h") {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }
        if args_vec.iter().any(|arg| arg == "--version" || arg == "-V") {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }

        let mut options = RunOptions::default();
        let mut idx = 0;

        // Value following a flag, or an error action when it is missing
        let value_for = |idx: usize, flag: &str| -> Result<String, CliAction> {
            match args_vec.get(idx + 1) {
                Some(value) if !value.starts_with("--") || value == "-" => Ok(value.clone()),
                _ => {
                    log_warning!("Missing value for {flag}");
                    Err(CliAction::ShowHelpDueToError)
                }
            }
        };

        while idx < args_vec.len() {
            let arg = args_vec[idx].as_str();
            match arg {
                "--debug" | "-d" => {
                    options.debug_enabled = true;
                    idx += 1;
                }
                "--test" => {
                    options.test_only = true;
                    idx += 1;
                }
                "--config" | "-c" => match value_for(idx, arg) {
                    Ok(path) => {
                        options.config_path = Some(PathBuf::from(path));
                        idx += 2;
                    }
                    Err(action) => return ParsedArgs { action },
                },
                "--logfile" => match value_for(idx, arg) {
                    Ok(path) => {
                        options.logfile = Some(path);
                        idx += 2;
                    }
                    Err(action) => return ParsedArgs { action },
                },
                "--pidfile" => match value_for(idx, arg) {
                    Ok(path) => {
                        options.pidfile = Some(PathBuf::from(path));
                        idx += 2;
                    }
                    Err(action) => return ParsedArgs { action },
                },
                "--simulate" | "-S" => {
                    match (args_vec.get(idx + 1), args_vec.get(idx + 2)) {
                        (Some(start), Some(end))
                            if !start.starts_with('-') && !end.starts_with('-') =>
                        {
                            options.simulate = Some((start.clone(), end.clone()));
                            idx += 3;
                        }
                        _ => {
                            log_warning!(
                                "Usage: duskglow --simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\""
                            );
                            return ParsedArgs {
                                action: CliAction::ShowHelpDueToError,
                            };
                        }
                    }
                }
                other => {
                    log_warning!("Unknown argument: {other}");
                    return ParsedArgs {
                        action: CliAction::ShowHelpDueToError,
                    };
                }
            }
        }

        ParsedArgs {
            action: CliAction::Run(options),
        }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("duskglow [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-c, --config <file>    Use this configuration file");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-h, --help             Print help information");
    log_indented!("    --logfile <file>   Append log output to a file ('-' for stdout)");
    log_indented!("    --pidfile <file>   Write and lock a PID file");
    log_indented!("-S, --simulate <start> <end>");
    log_indented!("                       Fast-forward between two local times");
    log_indented!("                       (format: \"YYYY-MM-DD HH:MM:SS\")");
    log_indented!("    --test             Switch the light off, print the schedule and exit");
    log_indented!("-V, --version          Print version information");
    log_end!();
}
