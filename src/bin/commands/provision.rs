use anyhow::Result;
use clap::Args;
use datavault::{ConfigStore, ForeignKeyPolicy, MySqlProvider, SchemaProvisioner};
use std::path::PathBuf;

/// Arguments for the Provision command
#[derive(Args)]
pub struct ProvisionArgs {
    /// Create the database first if it does not exist
    #[clap(long)]
    pub create_database: bool,

    /// JSON file describing the tables to provision instead of the built-in schema
    #[clap(short, long)]
    pub schema: Option<PathBuf>,

    /// How to treat foreign keys that already exist: skip-existing or always
    #[clap(long, default_value = "skip-existing")]
    pub fk_policy: ForeignKeyPolicy,

    /// TCP port of the database server
    #[clap(long)]
    pub port: Option<u16>,
}

pub fn run(config: ConfigStore, args: ProvisionArgs) -> Result<()> {
    let ProvisionArgs {
        create_database,
        schema,
        fk_policy,
        port,
    } = args;

    let vault = crate::open_vault(config, schema.as_deref())?;

    let provider = match port {
        Some(port) => MySqlProvider::with_port(port),
        None => MySqlProvider::new(),
    };
    let provisioner = SchemaProvisioner::new(provider).with_foreign_key_policy(fk_policy);

    if !vault.config().is_set("db") {
        println!("No database configured (use --db or DATAVAULT_DB); nothing to provision.");
        return Ok(());
    }

    if create_database && provisioner.ensure_database(vault.config())? {
        println!("Database '{}' is ready.", vault.config().get("db")?);
    }

    let report = vault.provision(&provisioner)?;
    for sql in &report.executed {
        println!("executed: {}", sql);
    }
    for sql in &report.skipped {
        println!("skipped (already present): {}", sql);
    }
    println!(
        "Provisioned {} tables in '{}'.",
        vault.catalog().len(),
        vault.config().get("db")?
    );
    Ok(())
}
