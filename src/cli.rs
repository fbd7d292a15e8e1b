use std::path::PathBuf;

use clap::Parser;
use clap::ValueHint;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print the input scheme and exit
    ///
    /// Writes the XML document describing this input's parameters to stdout.
    #[arg(long, conflicts_with = "validate_arguments")]
    pub scheme: bool,

    /// Validate the configuration and exit
    ///
    /// Currently accepts any configuration without reading it.
    #[arg(long)]
    pub validate_arguments: bool,

    /// Set the logging level
    ///
    /// Set the logging level used for messages written to stderr.
    #[arg(short, long, env="LOG_LEVEL", value_hint=ValueHint::Other, default_value="INFO")]
    pub loglevel: log::LevelFilter,

    /// Also log to this file
    ///
    /// Messages always go to stderr; this adds a copy in the given file.
    #[arg(long, env="LOG_FILE", value_hint=ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,
}

/// What a single invocation does, decided once from the flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Scheme,
    ValidateArguments,
    Run,
}

impl Cli {
    pub fn resolve(&self) -> Command {
        if self.scheme {
            Command::Scheme
        } else if self.validate_arguments {
            Command::ValidateArguments
        } else {
            Command::Run
        }
    }
}
