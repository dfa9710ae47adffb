//! Schema provisioning
//!
//! Provisioning runs in two passes over the catalog: every table is created
//! with `CREATE TABLE IF NOT EXISTS`, then every declared foreign key is added
//! with `ALTER TABLE ... ADD FOREIGN KEY`. Creating all tables first lets a
//! table reference one declared later in the catalog.
//!
//! Statements run one at a time and stop at the first failure. DDL commits
//! per statement on the server, so statements that already ran stay applied.

use super::connection::{with_connection, ConnectionProvider, DriverError, SchemaConnection};
use crate::config::{ConfigKey, ConfigStore};
use crate::error::{Result, VaultError};
use crate::schema::{ForeignKey, SchemaCatalog, TableSpec};
use std::fmt;
use tracing::{debug, info};

/// Render the `CREATE TABLE IF NOT EXISTS` statement for a table
pub fn create_table_sql(table: &TableSpec) -> String {
    let columns = table
        .columns()
        .iter()
        .map(|c| c.render())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "CREATE TABLE IF NOT EXISTS `{}` ({}, PRIMARY KEY (`{}`))",
        table.name(),
        columns,
        table.primary_key()
    )
}

/// Render the `ALTER TABLE ... ADD FOREIGN KEY` statement for a table
pub fn add_foreign_key_sql(table: &str, fk: &ForeignKey) -> String {
    format!(
        "ALTER TABLE `{}` ADD FOREIGN KEY (`{}`) REFERENCES `{}`(`{}`)",
        table,
        fk.column(),
        fk.ref_table(),
        fk.ref_column()
    )
}

/// How the foreign-key pass treats constraints that already exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignKeyPolicy {
    /// Ask the server first and skip foreign keys that are already in place,
    /// so provisioning can be repeated
    #[default]
    SkipExisting,
    /// Always issue the `ALTER TABLE`; a repeated run fails on the duplicate
    /// constraint
    AlwaysAdd,
}

impl std::str::FromStr for ForeignKeyPolicy {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "skip-existing" | "skip" => Ok(ForeignKeyPolicy::SkipExisting),
            "always" | "always-add" => Ok(ForeignKeyPolicy::AlwaysAdd),
            other => Err(VaultError::Config(format!(
                "unknown foreign key policy '{}' (expected skip-existing or always)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    CreateTable,
    AddForeignKey(ForeignKey),
}

/// One DDL statement of a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub table: String,
    pub kind: StatementKind,
    pub sql: String,
}

/// The ordered statements provisioning a catalog
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionPlan {
    statements: Vec<Statement>,
}

impl ProvisionPlan {
    pub fn build(catalog: &SchemaCatalog) -> Self {
        let tables = catalog.tables().iter().map(|table| Statement {
            table: table.name().to_string(),
            kind: StatementKind::CreateTable,
            sql: create_table_sql(table),
        });

        let foreign_keys = catalog.tables().iter().filter_map(|table| {
            table.foreign_key().map(|fk| Statement {
                table: table.name().to_string(),
                kind: StatementKind::AddForeignKey(fk.clone()),
                sql: add_foreign_key_sql(table.name(), fk),
            })
        });

        Self {
            statements: tables.chain(foreign_keys).collect(),
        }
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

}

impl fmt::Display for ProvisionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{};", statement.sql)?;
        }
        Ok(())
    }
}

/// Outcome of a provisioning run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Statements sent to the server, in order
    pub executed: Vec<String>,
    /// Foreign-key statements skipped because the constraint already existed
    pub skipped: Vec<String>,
}

impl ProvisionReport {
    /// True when provisioning did not touch the server
    pub fn is_noop(&self) -> bool {
        self.executed.is_empty() && self.skipped.is_empty()
    }
}

/// Materializes a [`SchemaCatalog`] on the configured database
pub struct SchemaProvisioner<P> {
    provider: P,
    foreign_keys: ForeignKeyPolicy,
}

impl<P: ConnectionProvider> SchemaProvisioner<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            foreign_keys: ForeignKeyPolicy::default(),
        }
    }

    pub fn with_foreign_key_policy(mut self, policy: ForeignKeyPolicy) -> Self {
        self.foreign_keys = policy;
        self
    }

    pub fn foreign_key_policy(&self) -> ForeignKeyPolicy {
        self.foreign_keys
    }

    /// Statements that [`SchemaProvisioner::provision`] would issue
    pub fn plan(catalog: &SchemaCatalog) -> ProvisionPlan {
        ProvisionPlan::build(catalog)
    }

    /// Create all tables of the catalog, then add their foreign keys.
    ///
    /// Does nothing when `db` is not configured or the catalog is empty.
    pub fn provision(&self, config: &ConfigStore, catalog: &SchemaCatalog) -> Result<ProvisionReport> {
        if !config.value_is_set(ConfigKey::Db) {
            debug!("no database configured, skipping schema provisioning");
            return Ok(ProvisionReport::default());
        }
        if catalog.is_empty() {
            debug!("schema catalog is empty, skipping schema provisioning");
            return Ok(ProvisionReport::default());
        }

        let plan = Self::plan(catalog);
        info!(
            "provisioning {} tables in database '{}' (foreign keys: {:?})",
            catalog.len(),
            config.value(ConfigKey::Db),
            self.foreign_key_policy()
        );

        let mut conn = self.provider.open(config, false)?;
        let mut report = ProvisionReport::default();

        for statement in plan.statements() {
            let fail = |e: DriverError| VaultError::provision(&statement.table, &statement.sql, e);

            if let StatementKind::AddForeignKey(fk) = &statement.kind {
                if self.foreign_keys == ForeignKeyPolicy::SkipExisting
                    && conn
                        .foreign_key_exists(&statement.table, fk)
                        .map_err(fail)?
                {
                    debug!("foreign key {} on '{}' already exists", fk, statement.table);
                    report.skipped.push(statement.sql.clone());
                    continue;
                }
            }

            debug!("executing: {}", statement.sql);
            conn.execute(&statement.sql).map_err(fail)?;
            report.executed.push(statement.sql.clone());
        }

        info!(
            "schema provisioned: {} statements executed, {} skipped",
            report.executed.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Create the configured database over a server-level connection.
    ///
    /// Returns false without connecting when `db` is not configured.
    pub fn ensure_database(&self, config: &ConfigStore) -> Result<bool> {
        if !config.value_is_set(ConfigKey::Db) {
            return Ok(false);
        }

        let database = config.value(ConfigKey::Db);
        let sql = format!("CREATE DATABASE IF NOT EXISTS `{}`", database);

        with_connection(&self.provider, config, true, |conn| {
            debug!("executing: {}", sql);
            conn.execute(&sql)
                .map_err(|e| VaultError::create_database(database, e))
        })?;
        info!("database '{}' is available", database);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::testing::FakeServer;
    use crate::schema::ColumnSpec;

    fn configured() -> ConfigStore {
        let mut config = ConfigStore::new();
        config.set("passwd", "2ZombiesEatBrains?").unwrap();
        config.set("db", "practice").unwrap();
        config
    }

    const CREATE_PRODUCTS: &str = "CREATE TABLE IF NOT EXISTS `products` (\
        `id_product` INT NOT NULL AUTO_INCREMENT, \
        `id_category` INT NOT NULL, \
        `name` VARCHAR(45) NOT NULL, \
        `stock_available` INT NOT NULL, \
        `selling_price` DECIMAL(13,2) NOT NULL, \
        PRIMARY KEY (`id_product`))";

    const CREATE_CATEGORIES: &str = "CREATE TABLE IF NOT EXISTS `categories` (\
        `id_category` INT NOT NULL AUTO_INCREMENT, \
        `title` VARCHAR(45) NOT NULL, \
        PRIMARY KEY (`id_category`))";

    const ADD_PRODUCTS_FK: &str = "ALTER TABLE `products` ADD FOREIGN KEY (`id_category`) \
        REFERENCES `categories`(`id_category`)";

    #[test]
    fn test_plan_for_default_catalog() {
        let plan = ProvisionPlan::build(&SchemaCatalog::default());
        let sql: Vec<&str> = plan.statements().iter().map(|s| s.sql.as_str()).collect();
        assert_eq!(sql, vec![CREATE_PRODUCTS, CREATE_CATEGORIES, ADD_PRODUCTS_FK]);
        assert!(matches!(
            plan.statements()[2].kind,
            StatementKind::AddForeignKey(_)
        ));
    }

    #[test]
    fn test_plan_display() {
        let plan = ProvisionPlan::build(&SchemaCatalog::default());
        let text = plan.to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with(";\n"));
    }

    #[test]
    fn test_foreign_keys_after_all_tables() {
        let child = TableSpec::new(
            "a_child",
            "id",
            Some(ForeignKey::to("parent_id", "z_parent", "id")),
            vec![ColumnSpec::new("id", "INT"), ColumnSpec::new("parent_id", "INT")],
        )
        .unwrap();
        let parent =
            TableSpec::new("z_parent", "id", None, vec![ColumnSpec::new("id", "INT")]).unwrap();
        let catalog = SchemaCatalog::new(vec![child, parent]).unwrap();

        let plan = ProvisionPlan::build(&catalog);
        let kinds: Vec<(&str, bool)> = plan
            .statements()
            .iter()
            .map(|s| (s.table.as_str(), s.kind == StatementKind::CreateTable))
            .collect();
        assert_eq!(
            kinds,
            vec![("a_child", true), ("z_parent", true), ("a_child", false)]
        );
    }

    #[test]
    fn test_provision_without_db_is_noop() {
        let server = FakeServer::new();
        let provisioner = SchemaProvisioner::new(server.provider());

        let report = provisioner
            .provision(&ConfigStore::new(), &SchemaCatalog::default())
            .unwrap();
        assert!(report.is_noop());
        assert_eq!(server.opened(), 0);
    }

    #[test]
    fn test_provision_empty_catalog_is_noop() {
        let server = FakeServer::new();
        let provisioner = SchemaProvisioner::new(server.provider());

        let report = provisioner
            .provision(&configured(), &SchemaCatalog::empty())
            .unwrap();
        assert!(report.is_noop());
        assert_eq!(server.opened(), 0);
    }

    #[test]
    fn test_provision_default_catalog() {
        let server = FakeServer::new();
        let provisioner = SchemaProvisioner::new(server.provider());

        let report = provisioner
            .provision(&configured(), &SchemaCatalog::default())
            .unwrap();

        assert_eq!(
            server.statements(),
            vec![CREATE_PRODUCTS, CREATE_CATEGORIES, ADD_PRODUCTS_FK]
        );
        assert_eq!(report.executed.len(), 3);
        assert!(report.skipped.is_empty());

        let connections = server.connections();
        assert_eq!(connections.len(), 1);
        assert_eq!(connections[0].database.as_deref(), Some("practice"));
        assert_eq!(connections[0].password, "2ZombiesEatBrains?");
        assert_eq!(server.closed(), 1);
    }

    #[test]
    fn test_provision_twice_skips_existing_foreign_key() {
        let server = FakeServer::new();
        let provisioner = SchemaProvisioner::new(server.provider());
        let config = configured();
        let catalog = SchemaCatalog::default();

        provisioner.provision(&config, &catalog).unwrap();
        let second = provisioner.provision(&config, &catalog).unwrap();

        assert_eq!(second.executed, vec![CREATE_PRODUCTS, CREATE_CATEGORIES]);
        assert_eq!(second.skipped, vec![ADD_PRODUCTS_FK]);
        assert_eq!(server.closed(), 2);
    }

    #[test]
    fn test_always_add_fails_on_second_run() {
        let server = FakeServer::new();
        let provisioner = SchemaProvisioner::new(server.provider())
            .with_foreign_key_policy(ForeignKeyPolicy::AlwaysAdd);
        let config = configured();
        let catalog = SchemaCatalog::default();

        provisioner.provision(&config, &catalog).unwrap();
        let err = provisioner.provision(&config, &catalog).unwrap_err();

        match err {
            VaultError::SchemaProvision {
                table,
                statement,
                message,
            } => {
                assert_eq!(table, "products");
                assert_eq!(statement, ADD_PRODUCTS_FK);
                assert!(message.contains("Duplicate"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(server.closed(), 2);
    }

    #[test]
    fn test_failure_stops_at_first_statement_without_rollback() {
        let server = FakeServer::new();
        server.fail_on("`categories` (", "Lost connection to MySQL server");
        let provisioner = SchemaProvisioner::new(server.provider());

        let err = provisioner
            .provision(&configured(), &SchemaCatalog::default())
            .unwrap_err();

        assert!(
            matches!(err, VaultError::SchemaProvision { ref table, .. } if table == "categories")
        );
        // products stays created, nothing after the failure was attempted
        assert_eq!(server.statements(), vec![CREATE_PRODUCTS]);
        assert_eq!(server.closed(), 1);
    }

    #[test]
    fn test_connection_failure() {
        let server = FakeServer::new();
        server.refuse_connections("Unknown database 'practice'");
        let provisioner = SchemaProvisioner::new(server.provider());

        let err = provisioner
            .provision(&configured(), &SchemaCatalog::default())
            .unwrap_err();
        assert!(matches!(err, VaultError::Connection { .. }));
    }

    #[test]
    fn test_ensure_database_uses_server_level_connection() {
        let server = FakeServer::new();
        let provisioner = SchemaProvisioner::new(server.provider());

        assert!(provisioner.ensure_database(&configured()).unwrap());
        assert_eq!(
            server.statements(),
            vec!["CREATE DATABASE IF NOT EXISTS `practice`"]
        );
        assert_eq!(server.connections()[0].database, None);
        assert_eq!(server.closed(), 1);
    }

    #[test]
    fn test_ensure_database_without_db() {
        let server = FakeServer::new();
        let provisioner = SchemaProvisioner::new(server.provider());

        assert!(!provisioner.ensure_database(&ConfigStore::new()).unwrap());
        assert_eq!(server.opened(), 0);
    }

    #[test]
    fn test_ensure_database_failure_names_database() {
        let server = FakeServer::new();
        server.fail_on("CREATE DATABASE", "Access denied for user 'root'");
        let provisioner = SchemaProvisioner::new(server.provider());

        let err = provisioner.ensure_database(&configured()).unwrap_err();
        match &err {
            VaultError::CreateDatabase { database, message } => {
                assert_eq!(database, "practice");
                assert!(message.contains("Access denied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().starts_with("failed to create database 'practice'"));
        assert_eq!(server.closed(), 1);
    }

    #[test]
    fn test_policy_defaults_to_skip_existing() {
        let server = FakeServer::new();
        let provisioner = SchemaProvisioner::new(server.provider());
        assert_eq!(provisioner.foreign_key_policy(), ForeignKeyPolicy::SkipExisting);

        let provisioner = provisioner.with_foreign_key_policy(ForeignKeyPolicy::AlwaysAdd);
        assert_eq!(provisioner.foreign_key_policy(), ForeignKeyPolicy::AlwaysAdd);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "skip-existing".parse::<ForeignKeyPolicy>().unwrap(),
            ForeignKeyPolicy::SkipExisting
        );
        assert_eq!(
            "ALWAYS".parse::<ForeignKeyPolicy>().unwrap(),
            ForeignKeyPolicy::AlwaysAdd
        );
        assert!("sometimes".parse::<ForeignKeyPolicy>().is_err());
    }
}
