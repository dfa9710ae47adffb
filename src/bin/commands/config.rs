use anyhow::{anyhow, Result};
use clap::Args;
use datavault::{ConfigStore, VaultConfig};
use std::path::Path;

/// Arguments for the Config command
#[derive(Args)]
pub struct ConfigArgs {
    /// Write a template configuration file if none exists
    #[clap(long)]
    pub init: bool,
}

fn config_file_path(config_path: Option<&str>) -> Result<String> {
    match config_path {
        Some(p) => Ok(p.to_string()),
        None => VaultConfig::default_file_path()
            .ok_or_else(|| anyhow!("Could not find home directory")),
    }
}

/// Write the template configuration file unless one already exists
pub fn init(config_path: Option<&str>) -> Result<()> {
    let path = config_file_path(config_path)?;
    if Path::new(&path).exists() {
        println!("Configuration file already exists: {}", path);
        return Ok(());
    }

    if let Some(parent) = Path::new(&path).parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| anyhow!("Unable to create config directory: {}", e))?;
    }
    VaultConfig::write_template(&path)?;
    println!("Created configuration file: {}", path);
    Ok(())
}

pub fn run(config: &ConfigStore, config_path: Option<&str>) -> Result<()> {
    let path = config_file_path(config_path)?;
    let exists = Path::new(&path).exists();

    println!(
        "Config File:  {}{}",
        path,
        if exists { "" } else { " (not found)" }
    );
    println!("{}", config.summary());
    Ok(())
}
