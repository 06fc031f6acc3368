//! Command-line definition.
//!
//! `--debug` is shorthand for `--log-level debug`.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::{LogLevel, Overrides};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "bulk-rename",
    author,
    version,
    about = "Preview, apply and undo regex-driven batch renames"
)]
pub struct Args {
    /// Files and directories to rename.
    #[arg(value_name = "PATHS", value_hint = ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Regular expression matched against each file name.
    #[arg(short = 'p', long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Replacement text; `$1`, `$2`... insert capture groups, `\$` is a literal dollar.
    #[arg(short = 'r', long, value_name = "TEXT")]
    pub replace: Option<String>,

    /// Print the preview and apply it without starting the interactive UI.
    #[arg(long, help = "Apply the rename non-interactively")]
    pub apply: bool,

    /// Apply even when the preview reports conflicts or duplicates (those items are skipped).
    #[arg(short = 'y', long, requires = "apply")]
    pub yes: bool,

    /// Config file to use instead of the default location.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Write logs to this file.
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Base URL of an OpenAI-compatible API used for name suggestions.
    #[arg(long, value_name = "URL")]
    pub api_endpoint: Option<String>,

    /// Model used for name suggestions.
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,
}

impl Args {
    pub fn overrides(&self) -> Overrides {
        let log_level = if self.debug {
            Some(LogLevel::Debug)
        } else {
            self.log_level
        };
        Overrides {
            api_endpoint: self.api_endpoint.clone(),
            model: self.model.clone(),
            log_level,
            log_file: self.log_file.clone(),
        }
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_deref().unwrap_or_default()
    }

    pub fn replacement(&self) -> &str {
        self.replace.as_deref().unwrap_or_default()
    }
}
