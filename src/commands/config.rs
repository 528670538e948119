use anyhow::Result;

use scd::DesiredConfiguration;

/// `--print-config`
pub fn cmd_print_config(config: &DesiredConfiguration) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&config.to_json())?);
    Ok(())
}
