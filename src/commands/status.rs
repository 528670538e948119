use anyhow::{bail, Result};

use scd::config::status_path;
use scd::infrastructure::JsonHostStatusRepository;
use scd::PersistentHostState;

use crate::ui::views::status::status_json;

fn load_state() -> PersistentHostState<JsonHostStatusRepository> {
    PersistentHostState::load(JsonHostStatusRepository::new(status_path()))
}

/// `--host-status [HOST]`
pub fn cmd_host_status(host: &str) -> Result<()> {
    let state = load_state();
    match status_json(state.store(), host) {
        Some(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        None => bail!("no status recorded for {}", host),
    }
}

/// `--clear-status HOST`
pub fn cmd_clear_status(host: &str, json: bool) -> Result<()> {
    let mut state = load_state();
    let cleared = state.clear(host)?;

    if json {
        crate::ui::json::emit(serde_json::json!({
            "event": "status_cleared",
            "host": host,
            "cleared": cleared,
        }))?;
    } else if cleared {
        println!("Cleared status of {}", host);
    } else {
        println!("No status recorded for {}", host);
    }
    Ok(())
}
