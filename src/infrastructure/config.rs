use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::domain::value_objects::IgnoredAttributes;

/// Prefix for environment overrides, e.g. `DBMAP__DB__MASTER__PWD=secret`.
pub const ENV_PREFIX: &str = "DBMAP";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub connector: Connector,
    pub db: DatabasesConfig,
    #[serde(default)]
    pub diff: DiffOptions,
}

/// How dbmap talks to the database. Only the sqlx connector exists;
/// `pdo` is accepted so configuration files written for the legacy tool
/// keep working.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Connector {
    #[serde(alias = "pdo")]
    Sqlx,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabasesConfig {
    pub master: DbConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    /// Database driver: "mysql" (default) or "mariadb".
    #[serde(default = "default_driver")]
    pub driver: String,
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub schema: String,
    pub user: String,
    pub pwd: String,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_driver() -> String {
    "mysql".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_acquire_timeout() -> u64 {
    30
}

/// Attribute filters applied by the differ. Empty by default: every
/// introspected attribute is compared.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DiffOptions {
    #[serde(default)]
    pub ignored_field_attributes: IgnoredAttributes,
    #[serde(default)]
    pub ignored_index_attributes: IgnoredAttributes,
}

impl DbConfig {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    fn validate(&self) -> Result<()> {
        if !matches!(self.driver.as_str(), "mysql" | "mariadb") {
            bail!(
                "Unsupported driver `{}` (expected `mysql` or `mariadb`)",
                self.driver
            );
        }
        for (key, value) in [
            ("server", &self.server),
            ("schema", &self.schema),
            ("user", &self.user),
        ] {
            if value.trim().is_empty() {
                bail!("db.master.{key} must not be empty");
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load a JSON or TOML configuration file (format picked from the
    /// extension), then apply `DBMAP__…` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("Configuration file not found: {}", path.display());
        }

        let cfg: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to read config file: {}", path.display()))?
            .try_deserialize()
            .with_context(|| format!("Bad configuration in {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Bad configuration in {}", path.display()))?;
        Ok(cfg)
    }

    /// Parse a JSON configuration document without touching the filesystem
    /// or the environment.
    pub fn from_json(content: &str) -> Result<Self> {
        let cfg: AppConfig =
            serde_json::from_str(content).context("Failed to parse config JSON")?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        self.db.master.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const LEGACY_JSON: &str = r#"{
        "connector": "pdo",
        "db": {
            "master": {
                "driver": "mysql",
                "server": "127.0.0.1",
                "schema": "shop",
                "user": "dbmap",
                "pwd": "secret"
            }
        }
    }"#;

    #[test]
    fn legacy_pdo_config_parses() {
        let cfg = AppConfig::from_json(LEGACY_JSON).unwrap();
        assert_eq!(cfg.connector, Connector::Sqlx);
        assert_eq!(cfg.db.master.schema, "shop");
        assert_eq!(cfg.db.master.port, 3306);
        assert_eq!(cfg.db.master.acquire_timeout(), Duration::from_secs(30));
        assert!(cfg.diff.ignored_index_attributes.0.is_empty());
    }

    #[test]
    fn missing_required_field_fails_closed() {
        let json = r#"{"connector":"sqlx","db":{"master":{"server":"h","schema":"s","user":"u"}}}"#;
        let err = AppConfig::from_json(json).unwrap_err();
        assert!(format!("{err:#}").contains("pwd"), "got: {err:#}");
    }

    #[test]
    fn unknown_connector_is_rejected() {
        let json = LEGACY_JSON.replace("\"pdo\"", "\"odbc\"");
        assert!(AppConfig::from_json(&json).is_err());
    }

    #[test]
    fn unsupported_driver_is_rejected() {
        let json = LEGACY_JSON.replace("\"mysql\"", "\"postgres\"");
        let err = AppConfig::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn empty_schema_is_rejected() {
        let json = LEGACY_JSON.replace("\"shop\"", "\"  \"");
        let err = AppConfig::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("schema"));
    }

    #[test]
    fn load_reads_toml_with_diff_options() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
connector = "sqlx"

[db.master]
driver = "mariadb"
server = "db.internal"
port = 3307
schema = "shop"
user = "dbmap"
pwd = "secret"

[diff]
ignored_index_attributes = ["cardinality"]
"#
        )
        .unwrap();

        let cfg = AppConfig::load(file.path()).unwrap();
        assert_eq!(cfg.db.master.driver, "mariadb");
        assert_eq!(cfg.db.master.port, 3307);
        assert!(cfg.diff.ignored_index_attributes.contains("cardinality"));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = AppConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
