use std::path::Path;

use anyhow::{Context, Result};
use weaver_core::WeaverConfig;

pub fn show(path: Option<&Path>) -> Result<()> {
    let config = WeaverConfig::load_or_default(path).context("Failed to load configuration")?;
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn path() -> Result<()> {
    let path = WeaverConfig::default_path()
        .context("Could not determine the user config directory")?;
    println!("{}", path.display());
    Ok(())
}
