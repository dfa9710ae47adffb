#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

//! Datavault - a small data-access layer for a product inventory database
//!
//! Datavault describes a fixed relational schema, opens connections to a MySQL
//! server from a handful of connection settings and provisions the schema with
//! idempotent `CREATE TABLE IF NOT EXISTS` statements. It also carries a
//! key/value scratch store for passing arbitrary data (for example an
//! imported spreadsheet) between application components.
//!
//! # Feature Flags
//!
//! | Feature | Description | Key Dependencies |
//! |---------|-------------|------------------|
//! | `mysql` | Live MySQL connections | `mysql` |
//! | `cli` | The `datavault` command-line tool | All above + `clap`, `tracing-subscriber` |
//!
//! ```toml
//! # Schema model, stores and provisioner driven by your own connection provider
//! datavault = { version = "0.1", default-features = false }
//!
//! # With the MySQL backend
//! datavault = { version = "0.1", default-features = false, features = ["mysql"] }
//! ```
//!
//! # Architecture
//!
//! - **[`schema`]**: `ColumnSpec`, `TableSpec` and the `SchemaCatalog`
//! - **[`config`]**: the `ConfigStore` of connection settings and file/env loading
//! - **[`scratch`]**: the `ScratchStore` side channel
//! - **[`database`]**: connection providers and the `SchemaProvisioner`
//! - **[`vault`]**: `DataVault`, the context object tying the above together
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use datavault::{DataVault, InitOptions, MySqlProvider, SchemaProvisioner};
//!
//! let provisioner = SchemaProvisioner::new(MySqlProvider::new());
//! let mut vault = DataVault::new();
//!
//! vault.init(
//!     InitOptions::new()
//!         .data("db_data", Vec::<Vec<String>>::new())
//!         .config("passwd", "secret")
//!         .config("db", "practice"),
//!     &provisioner,
//! )?;
//!
//! for name in vault.column_names("products")? {
//!     println!("{}", name);
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod schema;
pub mod scratch;
pub mod vault;

pub use config::{ConfigKey, ConfigStore, VaultConfig};
pub use error::{Result, VaultError};
pub use schema::{ColumnSpec, ForeignKey, SchemaCatalog, TableSpec};
pub use scratch::ScratchStore;
pub use vault::{DataVault, InitOptions};

pub use database::{
    ConnectParams, ConnectionProvider, ForeignKeyPolicy, ProvisionPlan, ProvisionReport,
    SchemaConnection, SchemaProvisioner,
};

#[cfg(feature = "mysql")]
pub use database::{MySqlConnection, MySqlProvider};
