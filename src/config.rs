use crate::error::{Result, VaultError};
use config::Config;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Prefix of environment variables read by [`VaultConfig::load`],
/// e.g. `DATAVAULT_DB=practice`
pub const ENV_PREFIX: &str = "DATAVAULT";

const EMPTY_CONFIG: &str = r#"### datavault configuration file

### database server connection
# host = "localhost"
# user = "root"
# passwd = ""
# db = "practice"
"#;

/// The recognized connection parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    Host,
    User,
    Passwd,
    Db,
}

impl ConfigKey {
    pub fn all() -> [ConfigKey; 4] {
        [
            ConfigKey::Host,
            ConfigKey::User,
            ConfigKey::Passwd,
            ConfigKey::Db,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::Host => "host",
            ConfigKey::User => "user",
            ConfigKey::Passwd => "passwd",
            ConfigKey::Db => "db",
        }
    }
}

impl FromStr for ConfigKey {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "host" => Ok(ConfigKey::Host),
            "user" => Ok(ConfigKey::User),
            "passwd" => Ok(ConfigKey::Passwd),
            "db" => Ok(ConfigKey::Db),
            other => Err(VaultError::UnknownConfigKey(other.to_string())),
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Connection parameters for the database server.
///
/// Only the keys of [`ConfigKey`] can be stored. A key counts as set when its
/// value is non-empty; the guarded [`ConfigStore::set_if_unset`] path never
/// replaces a value that is already set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigStore {
    host: String,
    user: String,
    passwd: String,
    db: String,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            user: "root".to_string(),
            passwd: String::new(),
            db: String::new(),
        }
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: ConfigKey) -> &String {
        match key {
            ConfigKey::Host => &self.host,
            ConfigKey::User => &self.user,
            ConfigKey::Passwd => &self.passwd,
            ConfigKey::Db => &self.db,
        }
    }

    fn slot_mut(&mut self, key: ConfigKey) -> &mut String {
        match key {
            ConfigKey::Host => &mut self.host,
            ConfigKey::User => &mut self.user,
            ConfigKey::Passwd => &mut self.passwd,
            ConfigKey::Db => &mut self.db,
        }
    }

    /// Set `key` unconditionally
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let key = key.parse()?;
        self.set_value(key, value);
        Ok(())
    }

    /// Set `key` only if it is not set yet; silently keeps an existing value
    pub fn set_if_unset(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let key: ConfigKey = key.parse()?;
        if self.value_is_set(key) {
            debug!("config key '{}' already set, keeping existing value", key);
        } else {
            self.set_value(key, value);
        }
        Ok(())
    }

    /// Get the stored value for `key`
    pub fn get(&self, key: &str) -> Result<&str> {
        ConfigKey::from_str(key)
            .map(|k| self.value(k))
            .map_err(|_| VaultError::MissingConfigKey(key.to_string()))
    }

    /// Whether `key` is recognized and holds a non-empty value
    pub fn is_set(&self, key: &str) -> bool {
        ConfigKey::from_str(key)
            .map(|k| self.value_is_set(k))
            .unwrap_or(false)
    }

    pub fn value(&self, key: ConfigKey) -> &str {
        self.slot(key).as_str()
    }

    pub fn set_value(&mut self, key: ConfigKey, value: impl Into<String>) {
        *self.slot_mut(key) = value.into();
    }

    pub fn value_is_set(&self, key: ConfigKey) -> bool {
        !self.slot(key).is_empty()
    }

    /// Display the effective settings with the password masked
    pub fn summary(&self) -> String {
        let or_unset = |key: ConfigKey| {
            if self.value_is_set(key) {
                self.value(key).to_string()
            } else {
                "(not set)".to_string()
            }
        };
        let passwd = if self.value_is_set(ConfigKey::Passwd) {
            "********".to_string()
        } else {
            "(not set)".to_string()
        };

        [
            format!("Host:      {}", or_unset(ConfigKey::Host)),
            format!("User:      {}", or_unset(ConfigKey::User)),
            format!("Password:  {}", passwd),
            format!("Database:  {}", or_unset(ConfigKey::Db)),
        ]
        .join("\n")
    }
}

/// Connection overrides gathered from a configuration file and the environment.
///
/// Overrides are applied through [`ConfigStore::set_if_unset`], so values
/// established earlier (for example from command-line flags) take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultConfig {
    overrides: BTreeMap<String, String>,
}

impl VaultConfig {
    /// Load overrides from a TOML file and `DATAVAULT_*` environment variables.
    ///
    /// With no explicit path, `$HOME/.datavault/datavault.toml` is read when it
    /// exists.
    pub fn load(path: Option<&str>) -> Result<VaultConfig> {
        Self::load_from(path, ENV_PREFIX)
    }

    fn load_from(path: Option<&str>, env_prefix: &str) -> Result<VaultConfig> {
        let mut builder = Config::builder();

        match path {
            Some(p) => {
                if !Path::new(p).exists() {
                    return Err(VaultError::Config(format!(
                        "config file '{}' does not exist",
                        p
                    )));
                }
                builder = builder.add_source(config::File::with_name(p));
            }
            None => {
                if let Some(p) = Self::default_file_path() {
                    if Path::new(&p).exists() {
                        debug!("reading configuration from {}", p);
                        builder = builder.add_source(config::File::with_name(&p));
                    }
                }
            }
        }

        builder = builder.add_source(config::Environment::with_prefix(env_prefix));

        let settings = builder
            .build()
            .map_err(|e| VaultError::Config(format!("failed to build configuration: {}", e)))?;

        let overrides = settings
            .try_deserialize::<BTreeMap<String, String>>()
            .map_err(|e| {
                VaultError::Config(format!("failed to deserialize configuration: {}", e))
            })?;

        for key in overrides.keys() {
            ConfigKey::from_str(key)?;
        }

        Ok(VaultConfig { overrides })
    }

    /// Build from explicit key/value pairs, rejecting unrecognized keys
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<VaultConfig>
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut overrides = BTreeMap::new();
        for (key, value) in pairs {
            let key = key.into();
            ConfigKey::from_str(&key)?;
            overrides.insert(key, value.into());
        }
        Ok(VaultConfig { overrides })
    }

    pub fn overrides(&self) -> &BTreeMap<String, String> {
        &self.overrides
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    /// Apply every override through the guarded update path
    pub fn apply(&self, store: &mut ConfigStore) -> Result<()> {
        for (key, value) in &self.overrides {
            store.set_if_unset(key, value.as_str())?;
        }
        Ok(())
    }

    /// Default configuration file location, `$HOME/.datavault/datavault.toml`
    pub fn default_file_path() -> Option<String> {
        dirs::home_dir().map(|h| {
            format!(
                "{}/.datavault/datavault.toml",
                h.to_string_lossy().trim_end_matches('/')
            )
        })
    }

    /// Write a commented template configuration file
    pub fn write_template(path: &str) -> Result<()> {
        std::fs::write(path, EMPTY_CONFIG)
            .map_err(|e| VaultError::Config(format!("unable to create config file {}: {}", path, e)))
    }
}
