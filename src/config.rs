//! Static configuration: where the database lives, which brands and materials
//! the forms offer, and the version string shown in the header.
//!
//! Lookup order:
//! 1. `config.toml` in the working directory
//! 2. `~/.filament-manager/config.toml`
//! 3. Built-in defaults (a template is written to the home location)

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

/// Folder name used beneath the user's home directory for application data.
pub const DATA_DIR_NAME: &str = ".filament-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "filaments.sqlite";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub brands: Vec<String>,
    pub materials: Vec<String>,
    pub version: String,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `sqlite:///path`, `sqlite://path`, or a plain file path. Unset means
    /// the database sits next to the config in the home data directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub enabled: bool,
    /// `EnvFilter` directive, e.g. `info` or `filament_manager=debug`.
    pub level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            brands: ["Prusament", "Hatchbox", "Polymaker", "eSun", "Overture", "Sunlu"]
                .map(String::from)
                .to_vec(),
            materials: ["PLA", "PETG", "ABS", "ASA", "TPU", "Nylon"]
                .map(String::from)
                .to_vec(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: DatabaseConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            dir: None,
        }
    }
}

impl LoggingConfig {
    /// Directory the log file is written into. Only touches the home
    /// directory when `dir` is unset.
    pub fn resolve_dir(&self) -> Result<PathBuf> {
        match &self.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(data_dir()?.join(LOG_DIR_NAME)),
        }
    }
}

impl Config {
    /// Find and parse the active configuration, seeding a template in the home
    /// data directory on first run.
    pub fn load() -> Result<Self> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.is_file() {
            return Self::load_from(&local);
        }

        let home = data_dir()?.join(CONFIG_FILE_NAME);
        if home.is_file() {
            return Self::load_from(&home);
        }

        let config = Self::default();
        config.write_template(&home)?;
        Ok(config)
    }

    /// Parse a TOML file. Keys left out of the file take their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject enumerations the forms could not offer sensibly.
    pub fn validate(&self) -> Result<()> {
        check_choices("brands", &self.brands)?;
        check_choices("materials", &self.materials)?;
        Ok(())
    }

    /// Filesystem location of the SQLite database.
    pub fn database_path(&self) -> Result<PathBuf> {
        match self.database.url.as_deref() {
            Some(url) => parse_database_url(url),
            None => Ok(data_dir()?.join(DB_FILE_NAME)),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }

    fn write_template(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create data directory")?;
        }
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("failed to write config template {}", path.display()))
    }
}

/// Resolve the `~/.filament-manager` directory.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

/// Strip the SQLAlchemy-style scheme so older config files keep working.
fn parse_database_url(url: &str) -> Result<PathBuf> {
    let trimmed = url.trim();
    let path = trimmed
        .strip_prefix("sqlite:///")
        .or_else(|| trimmed.strip_prefix("sqlite://"))
        .unwrap_or(trimmed);
    if path.is_empty() {
        bail!("database.url does not name a file: {url:?}");
    }
    Ok(PathBuf::from(path))
}

fn check_choices(key: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        bail!("config key `{key}` must list at least one entry");
    }
    let mut seen = HashSet::new();
    for value in values {
        if value.trim().is_empty() {
            bail!("config key `{key}` contains a blank entry");
        }
        if !seen.insert(value.as_str()) {
            bail!("config key `{key}` lists {value:?} more than once");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_every_key() {
        let file = write_config(
            r#"
version = "1.2.3"
brands = ["Prusament", "Bambu"]
materials = ["PLA"]

[database]
url = "sqlite:///data/filaments.db"

[logging]
enabled = false
level = "debug"
"#,
        );

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.version, "1.2.3");
        assert_eq!(config.brands, vec!["Prusament", "Bambu"]);
        assert_eq!(config.materials, vec!["PLA"]);
        assert!(!config.logging.enabled);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("data/filaments.db")
        );
    }

    #[test]
    fn missing_keys_take_defaults() {
        let file = write_config("brands = [\"Sunlu\"]\n");
        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.brands, vec!["Sunlu"]);
        assert_eq!(config.materials, Config::default().materials);
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert!(config.logging.enabled);
    }

    #[test]
    fn rejects_empty_and_duplicate_choices() {
        let empty = write_config("brands = []\n");
        assert!(Config::load_from(empty.path()).is_err());

        let blank = write_config("materials = [\"PLA\", \" \"]\n");
        assert!(Config::load_from(blank.path()).is_err());

        let dup = write_config("materials = [\"PLA\", \"PLA\"]\n");
        let err = Config::load_from(dup.path()).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn database_url_accepts_plain_paths() {
        assert_eq!(
            parse_database_url("sqlite://spools.db").unwrap(),
            PathBuf::from("spools.db")
        );
        assert_eq!(
            parse_database_url("/var/lib/spools.db").unwrap(),
            PathBuf::from("/var/lib/spools.db")
        );
        assert!(parse_database_url("sqlite:///").is_err());
    }

    #[test]
    fn explicit_log_dir_wins() {
        let logging = LoggingConfig {
            dir: Some(PathBuf::from("/tmp/spool-logs")),
            ..LoggingConfig::default()
        };
        assert_eq!(logging.resolve_dir().unwrap(), PathBuf::from("/tmp/spool-logs"));
    }

    #[test]
    fn template_parses_back() {
        let config = Config::default();
        let parsed: Config = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
