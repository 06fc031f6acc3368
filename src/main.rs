use anyhow::Result;
use clap::Parser;
use std::io;

use bulk_rename::cli::Args;
use bulk_rename::config::{AppConfig, resolve_config_path};
use bulk_rename::headless::{self, HeadlessRequest};
use bulk_rename::logging::{LogTarget, init_tracing};
use bulk_rename::tui::{self, TuiOptions};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let mut config = match &config_path {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    config.apply_env();
    config.apply_overrides(&args.overrides());

    let target = if args.apply {
        LogTarget::Stderr
    } else {
        LogTarget::FileOnly
    };
    let log_file = config.effective_log_file();
    let _guard = init_tracing(config.log_level, log_file.as_deref(), target)?;
    tracing::debug!(?config_path, ?log_file, "Starting");

    if args.apply {
        let request = HeadlessRequest {
            paths: args.paths.clone(),
            pattern: args.pattern().to_string(),
            replacement: args.replacement().to_string(),
            assume_yes: args.yes,
        };
        headless::run(&request, &mut io::stdout().lock())?;
        return Ok(());
    }

    tui::run_tui(TuiOptions {
        paths: args.paths.clone(),
        pattern: args.pattern().to_string(),
        replacement: args.replacement().to_string(),
        api: config.api_settings(),
        config_path,
    })
}
