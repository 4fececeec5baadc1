//! WikiDoc CLI - command-line front-end for the document store.
//!
//! The main entry point for the `wikidoc` binary.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use log::error;
use wikidoc_core::{init_logging, open_db, DocumentApi};

use wikidoc_cli::{base_config, commands, exit_code, Cli};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err:#}");
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config(base_config(|key| std::env::var(key).ok())?)?;

    init_logging(config.core.log_level, config.core.log_dir.as_deref())
        .context("failed to initialize logging")?;

    let conn = open_db(&config.core.db_path).with_context(|| {
        format!(
            "failed to open database `{}`",
            config.core.db_path.display()
        )
    })?;
    let api = DocumentApi::sqlite(&conn)?;

    let mut out = std::io::stdout().lock();
    commands::execute(cli.command, &api, &config, &mut out)
}
