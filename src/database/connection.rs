//! Database connection management
//!
//! Connections are opened from the values held in a [`ConfigStore`] and are
//! scoped: a connection lives only as long as the value returned by
//! [`ConnectionProvider::open`], and dropping it releases the server session
//! on every exit path.

use crate::config::{ConfigKey, ConfigStore};
use crate::error::{Result, VaultError};
use crate::schema::ForeignKey;
use tracing::debug;

/// Failure reported by a database driver
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// Parameters used to open a server connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
    pub host: String,
    pub user: String,
    pub password: String,
    /// Database to select; `None` for a server-level session
    pub database: Option<String>,
}

impl ConnectParams {
    /// Build parameters from the configuration.
    ///
    /// The password is only taken when set. The database is selected only when
    /// `db` is set and `ignore_database` is false.
    pub fn from_config(config: &ConfigStore, ignore_database: bool) -> Self {
        let password = if config.value_is_set(ConfigKey::Passwd) {
            config.value(ConfigKey::Passwd).to_string()
        } else {
            String::new()
        };

        let database = if config.value_is_set(ConfigKey::Db) && !ignore_database {
            Some(config.value(ConfigKey::Db).to_string())
        } else {
            None
        };

        Self {
            host: config.value(ConfigKey::Host).to_string(),
            user: config.value(ConfigKey::User).to_string(),
            password,
            database,
        }
    }
}

/// A live session able to run DDL statements
pub trait SchemaConnection {
    /// Execute a statement that returns no rows
    fn execute(&mut self, sql: &str) -> std::result::Result<(), DriverError>;

    /// Whether `table` already carries a foreign key equivalent to `fk`
    fn foreign_key_exists(
        &mut self,
        table: &str,
        fk: &ForeignKey,
    ) -> std::result::Result<bool, DriverError>;
}

/// Opens connections to a database server
pub trait ConnectionProvider {
    type Connection: SchemaConnection;

    /// Open a connection with explicit parameters
    fn connect(&self, params: &ConnectParams) -> std::result::Result<Self::Connection, DriverError>;

    /// Open a connection using the configured host, user, password and database
    fn open(&self, config: &ConfigStore, ignore_database: bool) -> Result<Self::Connection> {
        let params = ConnectParams::from_config(config, ignore_database);
        debug!(
            "connecting to {}@{} (database: {})",
            params.user,
            params.host,
            params.database.as_deref().unwrap_or("<none>")
        );
        self.connect(&params).map_err(VaultError::connection)
    }
}

/// Run `f` with a freshly opened connection, releasing it afterwards whether
/// `f` succeeds or fails
pub fn with_connection<P, T, F>(
    provider: &P,
    config: &ConfigStore,
    ignore_database: bool,
    f: F,
) -> Result<T>
where
    P: ConnectionProvider,
    F: FnOnce(&mut P::Connection) -> Result<T>,
{
    let mut conn = provider.open(config, ignore_database)?;
    f(&mut conn)
}
