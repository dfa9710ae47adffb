use anyhow::Result;
use clap::Args;
use datavault::ConfigStore;
use serde_json::json;
use std::path::PathBuf;

/// Arguments for the Columns command
#[derive(Args)]
pub struct ColumnsArgs {
    /// Table to describe
    #[clap(name = "TABLE")]
    pub table: String,

    /// Print full column definitions instead of names
    #[clap(short, long)]
    pub full: bool,

    /// Output as JSON
    #[clap(long)]
    pub json: bool,

    /// JSON file describing the tables instead of the built-in schema
    #[clap(short, long)]
    pub schema: Option<PathBuf>,
}

pub fn run(config: ConfigStore, args: ColumnsArgs) -> Result<()> {
    let ColumnsArgs {
        table,
        full,
        json,
        schema,
    } = args;

    let vault = crate::open_vault(config, schema.as_deref())?;

    if json {
        let value = if full {
            json!(vault.columns(&table)?)
        } else {
            json!(vault.column_names(&table)?)
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if full {
        for column in vault.columns(&table)? {
            println!("{}", column);
        }
    } else {
        for name in vault.column_names(&table)? {
            println!("{}", name);
        }
    }
    Ok(())
}
