//! Schema catalog and the default schema

use super::column::ColumnSpec;
use super::table::{ForeignKey, TableSpec};
use crate::error::{Result, VaultError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ordered list of the tables making up the schema.
///
/// Tables are created in catalog order; foreign keys are applied afterwards,
/// so a table may reference one declared later in the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TableSpec>", into = "Vec<TableSpec>")]
pub struct SchemaCatalog {
    tables: Vec<TableSpec>,
}

impl SchemaCatalog {
    /// Create a catalog, rejecting duplicate table names
    pub fn new(tables: Vec<TableSpec>) -> Result<Self> {
        for (i, table) in tables.iter().enumerate() {
            if tables[..i].iter().any(|t| t.name() == table.name()) {
                return Err(VaultError::invalid_schema(
                    table.name(),
                    "table is declared more than once in the catalog",
                ));
            }
        }
        Ok(Self { tables })
    }

    /// A catalog without tables; provisioning it does nothing
    pub fn empty() -> Self {
        Self { tables: Vec::new() }
    }

    /// Load a catalog from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            VaultError::Config(format!(
                "unable to read schema file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| match e.classify() {
            // validation failures surface through serde as custom data errors
            serde_json::error::Category::Data => {
                VaultError::invalid_schema("<catalog>", e.to_string())
            }
            _ => VaultError::Config(format!("invalid schema JSON: {}", e)),
        })
    }

    pub fn tables(&self) -> &[TableSpec] {
        &self.tables
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Find a table by name
    pub fn table(&self, name: &str) -> Result<&TableSpec> {
        self.tables
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| VaultError::UnknownTable(name.to_string()))
    }

    /// Ordered column names of a table
    pub fn column_names(&self, table: &str) -> Result<Vec<&str>> {
        Ok(self.table(table)?.column_names())
    }

    /// Ordered column definitions of a table
    pub fn columns(&self, table: &str) -> Result<&[ColumnSpec]> {
        Ok(self.table(table)?.columns())
    }
}

impl TryFrom<Vec<TableSpec>> for SchemaCatalog {
    type Error = VaultError;

    fn try_from(tables: Vec<TableSpec>) -> Result<Self> {
        Self::new(tables)
    }
}

impl From<SchemaCatalog> for Vec<TableSpec> {
    fn from(catalog: SchemaCatalog) -> Self {
        catalog.tables
    }
}

impl Default for SchemaCatalog {
    /// The product inventory schema: `products` referencing `categories`
    fn default() -> Self {
        let products = TableSpec {
            name: "products".to_string(),
            primary_key: "id_product".to_string(),
            foreign_key: Some(ForeignKey::to("id_category", "categories", "id_category")),
            columns: vec![
                ColumnSpec::new("id_product", "INT")
                    .not_null()
                    .auto_increment(),
                ColumnSpec::new("id_category", "INT").not_null(),
                ColumnSpec::with_default_type("name").not_null(),
                ColumnSpec::new("stock_available", "INT").not_null(),
                ColumnSpec::new("selling_price", "DECIMAL(13,2)").not_null(),
            ],
        };

        let categories = TableSpec {
            name: "categories".to_string(),
            primary_key: "id_category".to_string(),
            foreign_key: None,
            columns: vec![
                ColumnSpec::new("id_category", "INT")
                    .not_null()
                    .auto_increment(),
                ColumnSpec::with_default_type("title").not_null(),
            ],
        };

        Self {
            tables: vec![products, categories],
        }
    }
}
