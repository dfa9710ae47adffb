//! Application context
//!
//! [`DataVault`] bundles the connection configuration, the scratch store and
//! the schema catalog. One instance is built at startup and handed by
//! reference to the components that need it.

use crate::config::{ConfigStore, VaultConfig};
use crate::database::{ConnectionProvider, ProvisionReport, SchemaProvisioner};
use crate::error::Result;
use crate::schema::{ColumnSpec, SchemaCatalog};
use crate::scratch::ScratchStore;
use std::any::Any;
use tracing::debug;

/// Values handed to [`DataVault::init`]
#[derive(Default)]
pub struct InitOptions {
    data: Vec<(String, Box<dyn Any + Send + Sync>)>,
    catalog: Option<SchemaCatalog>,
    config: Vec<(String, String)>,
}

impl InitOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the scratch store
    pub fn data<T>(mut self, key: impl Into<String>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.data.push((key.into(), Box::new(value)));
        self
    }

    /// Replace the schema catalog wholesale
    pub fn catalog(mut self, catalog: SchemaCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Add a connection setting; applied only if the key is still unset
    pub fn config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.push((key.into(), value.into()));
        self
    }

    /// Add every override loaded from a file or the environment
    pub fn config_overrides(mut self, overrides: &VaultConfig) -> Self {
        self.config.extend(
            overrides
                .overrides()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        self
    }
}

#[derive(Debug, Default)]
pub struct DataVault {
    config: ConfigStore,
    scratch: ScratchStore,
    catalog: SchemaCatalog,
}

impl DataVault {
    /// Default configuration, empty scratch store and the default catalog
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parts(config: ConfigStore, catalog: SchemaCatalog) -> Self {
        Self {
            config,
            scratch: ScratchStore::new(),
            catalog,
        }
    }

    /// Apply `options` and provision the schema.
    ///
    /// Scratch data is stored first, then the catalog is replaced, then each
    /// configuration value goes through [`ConfigStore::set_if_unset`]. An
    /// unknown configuration key aborts before anything is provisioned; the
    /// changes already applied are kept.
    pub fn init<P: ConnectionProvider>(
        &mut self,
        options: InitOptions,
        provisioner: &SchemaProvisioner<P>,
    ) -> Result<ProvisionReport> {
        let InitOptions {
            data,
            catalog,
            config,
        } = options;

        for (key, value) in data {
            self.scratch.put_boxed(key, value, true);
        }

        if let Some(catalog) = catalog {
            debug!("replacing schema catalog ({} tables)", catalog.len());
            self.catalog = catalog;
        }

        for (key, value) in config {
            self.config.set_if_unset(&key, value)?;
        }

        self.provision(provisioner)
    }

    /// Provision the current catalog with the current configuration
    pub fn provision<P: ConnectionProvider>(
        &self,
        provisioner: &SchemaProvisioner<P>,
    ) -> Result<ProvisionReport> {
        provisioner.provision(&self.config, &self.catalog)
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn scratch(&self) -> &ScratchStore {
        &self.scratch
    }

    pub fn scratch_mut(&mut self) -> &mut ScratchStore {
        &mut self.scratch
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn column_names(&self, table: &str) -> Result<Vec<&str>> {
        self.catalog.column_names(table)
    }

    pub fn columns(&self, table: &str) -> Result<&[ColumnSpec]> {
        self.catalog.columns(table)
    }
}
