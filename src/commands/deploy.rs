use anyhow::Result;

use scd::config::{self, CliOverrides};
use scd::domain::ports::DeployEventSink;
use scd::domain::value_objects::Password;
use scd::error::ConfigError;
use scd::infrastructure::{CleanupRegistry, JsonEventSink, JsonHostStatusRepository, SshConnector};
use scd::{DesiredConfiguration, Orchestrator, PersistentHostState};

use crate::cli::Cli;
use crate::ui::output::print_config_warnings;
use crate::ui::sink::ConsoleEventSink;
use crate::ui::terminal::TerminalCapabilities;
use crate::ui::views::deploy::render_summary;

/// Load the config file and layer environment and CLI overrides on top.
pub fn load_configuration(cli: &Cli) -> Result<DesiredConfiguration> {
    let path = config::config_path();
    let (file, warnings) = config::load_config_file(&path)?;
    if !cli.json {
        print_config_warnings(&path, &warnings);
    }
    for warning in &warnings {
        tracing::debug!(key = %warning.key, "unknown config key");
    }

    let overrides = CliOverrides {
        hosts: cli.hosts.clone(),
        user: cli.user.clone(),
        port: cli.port,
        private_key: cli.private_key.clone(),
        password: read_password(cli)?,
    };

    Ok(config::resolve(
        config::with_env_overrides(file),
        overrides,
        &path,
    )?)
}

fn read_password(cli: &Cli) -> Result<Option<Password>, ConfigError> {
    if let Some(password) = &cli.password {
        return Ok(Some(Password::new(password.as_str())));
    }
    if let Some(path) = &cli.password_file {
        return config::read_password_file(path).map(Some);
    }
    if cli.read_password {
        let secret = dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .map_err(|e| ConfigError::PasswordPrompt(e.to_string()))?;
        return Ok(Some(Password::new(secret)));
    }
    Ok(None)
}

/// Deploy to every configured host. Returns false if any host failed.
pub fn cmd_deploy(
    cli: &Cli,
    config: &DesiredConfiguration,
    caps: TerminalCapabilities,
    cleanup: CleanupRegistry,
) -> Result<bool> {
    let connector = SshConnector::new(config.connection.clone(), cleanup.clone());
    let state = PersistentHostState::load(JsonHostStatusRepository::new(config::status_path()));

    let console;
    let json_sink;
    let events: &dyn DeployEventSink = if cli.json {
        json_sink = JsonEventSink::stdout();
        &json_sink
    } else {
        console = ConsoleEventSink::new(caps, cli.verbose);
        &console
    };

    let mut orchestrator = Orchestrator::new(&connector, state, events, cleanup).force(cli.force);
    let summary = orchestrator.run(config)?;

    if !cli.json {
        for line in render_summary(&summary, &caps) {
            println!("{}", line);
        }
    }
    Ok(summary.is_success())
}
