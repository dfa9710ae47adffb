//! MySQL backend
//!
//! Uses the synchronous `mysql` driver. A [`MySqlConnection`] owns one server
//! session; dropping it closes the session.

use super::connection::{ConnectParams, ConnectionProvider, DriverError, SchemaConnection};
use crate::schema::ForeignKey;
use ::mysql::prelude::Queryable;
use ::mysql::{Conn, OptsBuilder};

const FOREIGN_KEY_EXISTS_SQL: &str = r#"
    SELECT COUNT(*)
    FROM information_schema.KEY_COLUMN_USAGE
    WHERE TABLE_SCHEMA = DATABASE()
      AND TABLE_NAME = ?
      AND COLUMN_NAME = ?
      AND REFERENCED_TABLE_NAME = ?
      AND REFERENCED_COLUMN_NAME = ?
"#;

/// Opens MySQL sessions with the configured credentials
#[derive(Debug, Clone, Default)]
pub struct MySqlProvider {
    port: Option<u16>,
}

impl MySqlProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect to a non-default TCP port
    pub fn with_port(port: u16) -> Self {
        Self { port: Some(port) }
    }
}

impl ConnectionProvider for MySqlProvider {
    type Connection = MySqlConnection;

    fn connect(&self, params: &ConnectParams) -> Result<MySqlConnection, DriverError> {
        let mut opts = OptsBuilder::new()
            .ip_or_hostname(Some(params.host.as_str()))
            .user(Some(params.user.as_str()))
            .pass(Some(params.password.as_str()))
            .db_name(params.database.as_deref());
        if let Some(port) = self.port {
            opts = opts.tcp_port(port);
        }

        let conn = Conn::new(opts).map_err(|e| DriverError::from(e.to_string()))?;
        Ok(MySqlConnection { conn })
    }
}

/// One MySQL server session
pub struct MySqlConnection {
    conn: Conn,
}

impl SchemaConnection for MySqlConnection {
    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.conn
            .query_drop(sql)
            .map_err(|e| DriverError::from(e.to_string()))
    }

    fn foreign_key_exists(&mut self, table: &str, fk: &ForeignKey) -> Result<bool, DriverError> {
        let count: Option<u64> = self
            .conn
            .exec_first(
                FOREIGN_KEY_EXISTS_SQL,
                (table, fk.column(), fk.ref_table(), fk.ref_column()),
            )
            .map_err(|e| DriverError::from(e.to_string()))?;
        Ok(count.unwrap_or(0) > 0)
    }
}
