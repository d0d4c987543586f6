//! `canopy config`: show and edit configuration.

use anyhow::Result;

use crate::commands::CommandContext;
use crate::config::update_config_field;
use crate::display::print_success;

pub fn show(json: bool) -> Result<()> {
    let ctx = CommandContext::load()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&ctx.config)?);
    } else {
        // TOML, same shape the config file uses.
        println!("{}", toml::to_string_pretty(&ctx.config)?);
    }
    Ok(())
}

pub fn set(key: String, value: String) -> Result<()> {
    let ctx = CommandContext::load()?;
    update_config_field(&ctx.repo_root, &key, &value)?;
    print_success(&format!("Set {key} = {value}"));
    Ok(())
}
