use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use datavault::{ConfigStore, DataVault, SchemaCatalog, VaultConfig};
use std::path::Path;
use tracing::Level;

mod commands;

use commands::columns::ColumnsArgs;
use commands::config::ConfigArgs;
use commands::ddl::DdlArgs;
use commands::provision::ProvisionArgs;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(propagate_version = true)]
struct Cli {
    /// configuration file path, by default $HOME/.datavault/datavault.toml is used
    #[clap(short, long)]
    config: Option<String>,

    /// Print debug information
    #[clap(long)]
    debug: bool,

    /// Database server host
    #[clap(long, global = true)]
    host: Option<String>,

    /// Database user
    #[clap(short, long, global = true)]
    user: Option<String>,

    /// Database password
    #[clap(short, long, global = true)]
    password: Option<String>,

    /// Database name
    #[clap(long, global = true)]
    db: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the schema tables and foreign keys on the configured database.
    Provision(ProvisionArgs),

    /// Print the statements provisioning would issue, without connecting.
    Ddl(DdlArgs),

    /// List the columns of a table in the schema catalog.
    Columns(ColumnsArgs),

    /// Show the effective connection configuration.
    Config(ConfigArgs),
}

impl Commands {
    fn reads_settings(&self) -> bool {
        matches!(self, Commands::Provision(_) | Commands::Config(_))
    }
}

impl Cli {
    /// Flags first, then file and environment values for whatever is still unset.
    ///
    /// Commands that never connect skip the file and environment layer.
    fn connection_config(&self) -> Result<ConfigStore> {
        let mut store = ConfigStore::new();
        let flags = [
            ("host", &self.host),
            ("user", &self.user),
            ("passwd", &self.password),
            ("db", &self.db),
        ];
        for (key, value) in flags {
            if let Some(value) = value {
                store.set(key, value.as_str())?;
            }
        }

        if self.command.reads_settings() {
            let overrides = VaultConfig::load(self.config.as_deref())?;
            overrides.apply(&mut store)?;
        }
        Ok(store)
    }
}

/// Build the context, replacing the default catalog when a schema file is given
pub(crate) fn open_vault(config: ConfigStore, schema: Option<&Path>) -> Result<DataVault> {
    let catalog = match schema {
        Some(path) => SchemaCatalog::from_json_file(path)
            .map_err(|e| anyhow!("unable to load schema {}: {}", path.display(), e))?,
        None => SchemaCatalog::default(),
    };
    Ok(DataVault::with_parts(config, catalog))
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Config(ConfigArgs { init: true }) = &cli.command {
        commands::config::init(cli.config.as_deref())?;
    }

    let config = cli.connection_config()?;

    match cli.command {
        Commands::Provision(args) => commands::provision::run(config, args),
        Commands::Ddl(args) => commands::ddl::run(config, args),
        Commands::Columns(args) => commands::columns::run(config, args),
        Commands::Config(_) => commands::config::run(&config, cli.config.as_deref()),
    }
}

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt()
            // filter spans/events with level DEBUG or higher.
            .with_max_level(Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    if let Err(e) = run(cli) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }
}
