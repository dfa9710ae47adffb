use anyhow::Result;
use clap::Args;
use datavault::{ConfigStore, ProvisionPlan};
use std::path::PathBuf;

/// Arguments for the Ddl command
#[derive(Args)]
pub struct DdlArgs {
    /// JSON file describing the tables instead of the built-in schema
    #[clap(short, long)]
    pub schema: Option<PathBuf>,
}

pub fn run(config: ConfigStore, args: DdlArgs) -> Result<()> {
    let vault = crate::open_vault(config, args.schema.as_deref())?;
    print!("{}", ProvisionPlan::build(vault.catalog()));
    Ok(())
}
