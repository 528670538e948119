//! scd - deploy shell configuration to remote hosts over SSH
//!
//! Usage: scd [HOSTS]... [OPTIONS]
//!
//! Without flags every configured host is reconciled and deployed. The
//! status flags (`--host-status`, `--clear-status`) and `--print-config`
//! only inspect local state and exit.

mod cli;
mod commands;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use scd::infrastructure::CleanupRegistry;

use crate::cli::Cli;
use crate::ui::terminal::{detect_capabilities, TerminalCapabilities};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let caps = if cli.no_color {
        detect_capabilities().without_color()
    } else {
        detect_capabilities()
    };

    let cleanup = CleanupRegistry::new();
    let on_interrupt = cleanup.clone();
    ctrlc::set_handler(move || {
        on_interrupt.run();
        std::process::exit(130);
    })?;

    match run(&cli, caps, cleanup) {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            if cli.json {
                let _ = ui::json::emit(serde_json::json!({
                    "event": "error",
                    "message": format!("{:#}", err),
                }));
            } else {
                ui::output::print_error(&format!("{:#}", err), caps.supports_color);
            }
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli, caps: TerminalCapabilities, cleanup: CleanupRegistry) -> Result<bool> {
    if let Some(host) = &cli.clear_status {
        commands::status::cmd_clear_status(host, cli.json)?;
        return Ok(true);
    }
    if let Some(host) = &cli.host_status {
        commands::status::cmd_host_status(host)?;
        return Ok(true);
    }

    let config = commands::deploy::load_configuration(cli)?;
    if cli.print_config {
        commands::config::cmd_print_config(&config)?;
        return Ok(true);
    }

    commands::deploy::cmd_deploy(cli, &config, caps, cleanup)
}

/// `RUST_LOG` wins; otherwise `-v` enables debug and `-vv` trace logging.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "scd=debug",
        _ => "scd=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
