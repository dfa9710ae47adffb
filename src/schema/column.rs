//! Column definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type used for columns declared without an explicit type
pub const DEFAULT_COLUMN_TYPE: &str = "VARCHAR(45)";

fn default_column_type() -> String {
    DEFAULT_COLUMN_TYPE.to_string()
}

fn default_allow_nulls() -> bool {
    true
}

/// One column of a table.
///
/// The type expression is passed through verbatim when rendered, so any
/// expression the server understands (`INT`, `VARCHAR(45)`, `DECIMAL(13,2)`)
/// can be used. A column is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    name: String,
    #[serde(rename = "type", default = "default_column_type")]
    data_type: String,
    #[serde(default = "default_allow_nulls")]
    allow_nulls: bool,
    #[serde(default)]
    auto_increment: bool,
}

impl ColumnSpec {
    /// Create a nullable column of the given type
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            allow_nulls: true,
            auto_increment: false,
        }
    }

    /// Create a nullable column of [`DEFAULT_COLUMN_TYPE`]
    pub fn with_default_type(name: impl Into<String>) -> Self {
        Self::new(name, DEFAULT_COLUMN_TYPE)
    }

    pub fn not_null(mut self) -> Self {
        self.allow_nulls = false;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn allows_nulls(&self) -> bool {
        self.allow_nulls
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    /// Render the column-definition fragment used inside `CREATE TABLE`
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.name, self.data_type)?;
        if !self.allow_nulls {
            write!(f, " NOT NULL")?;
        }
        if self.auto_increment {
            write!(f, " AUTO_INCREMENT")?;
        }
        Ok(())
    }
}
