//! Error types for datavault.

use thiserror::Error;

/// Main error type for datavault operations.
#[derive(Error, Debug)]
pub enum VaultError {
    /// A configuration key outside the recognized set was referenced
    #[error("unknown configuration key '{0}' (expected one of: host, user, passwd, db)")]
    UnknownConfigKey(String),

    /// A configuration key was never declared
    #[error("configuration key '{0}' is not present")]
    MissingConfigKey(String),

    /// Nothing is stored under this scratch key
    #[error("no data stored under key '{0}'")]
    MissingDataKey(String),

    /// Scratch data exists but is of a different type than requested
    #[error("data stored under key '{key}' is not a {expected}")]
    DataTypeMismatch { key: String, expected: &'static str },

    /// No table with this name in the schema catalog
    #[error("table '{0}' does not exist in the schema catalog")]
    UnknownTable(String),

    /// Table or catalog definition failed validation
    #[error("invalid schema for table '{table}': {reason}")]
    InvalidSchema { table: String, reason: String },

    /// The driver failed to open a connection
    #[error("failed to connect to database server: {message}")]
    Connection { message: String },

    /// A DDL statement failed while provisioning the schema
    #[error("failed to provision table '{table}': {message}\n  Statement: {statement}")]
    SchemaProvision {
        table: String,
        statement: String,
        message: String,
    },

    /// The server refused `CREATE DATABASE`
    #[error("failed to create database '{database}': {message}")]
    CreateDatabase { database: String, message: String },

    /// Configuration could not be loaded from file or environment
    #[error("configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// Create a Connection error from any driver failure
    pub fn connection(message: impl ToString) -> Self {
        VaultError::Connection {
            message: message.to_string(),
        }
    }

    /// Create a SchemaProvision error for a failed statement
    pub fn provision(
        table: impl Into<String>,
        statement: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        VaultError::SchemaProvision {
            table: table.into(),
            statement: statement.into(),
            message: message.to_string(),
        }
    }

    /// Create a CreateDatabase error
    pub fn create_database(database: impl Into<String>, message: impl ToString) -> Self {
        VaultError::CreateDatabase {
            database: database.into(),
            message: message.to_string(),
        }
    }

    /// Create an InvalidSchema error
    pub fn invalid_schema(table: impl Into<String>, reason: impl Into<String>) -> Self {
        VaultError::InvalidSchema {
            table: table.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for datavault operations.
pub type Result<T> = std::result::Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provision_error_carries_table_and_message() {
        let err = VaultError::provision(
            "products",
            "ALTER TABLE `products` ADD FOREIGN KEY (id_category) REFERENCES categories(id_category)",
            "Duplicate foreign key constraint name",
        );
        let text = err.to_string();
        assert!(text.contains("'products'"));
        assert!(text.contains("Duplicate foreign key"));
        assert!(text.contains("ALTER TABLE"));
    }

    #[test]
    fn test_unknown_config_key_message() {
        let err = VaultError::UnknownConfigKey("port".to_string());
        assert!(err.to_string().contains("'port'"));
    }
}
