//! Database access
//!
//! - `ConnectionProvider` / `SchemaConnection`: the driver seam, opened from a `ConfigStore`
//! - `SchemaProvisioner`: two-pass creation of the tables of a `SchemaCatalog`
//! - `MySqlProvider`: the MySQL backend (feature `mysql`)

mod connection;
#[cfg(feature = "mysql")]
mod mysql_conn;
mod provision;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{
    with_connection, ConnectParams, ConnectionProvider, DriverError, SchemaConnection,
};
#[cfg(feature = "mysql")]
pub use mysql_conn::{MySqlConnection, MySqlProvider};
pub use provision::{
    add_foreign_key_sql, create_table_sql, ForeignKeyPolicy, ProvisionPlan, ProvisionReport,
    SchemaProvisioner, Statement, StatementKind,
};
