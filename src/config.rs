use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::bail;

pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 5432;
pub const DEFAULT_DATA_ROOT: &str = "/app/data";

pub const INBOX_DIR: &str = "inbox";
pub const PROCESSED_DIR: &str = "processed";
pub const REJECTS_DIR: &str = "rejects";

pub const INGREDIENT_FILE: &str = "ingredients.csv";
pub const SNAPSHOT_PREFIX: &str = "inventory_snapshot_";
pub const SNAPSHOT_EXTENSION: &str = ".csv";

/// PostgreSQL connection parameters.
#[derive(Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl DbConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.host.trim().is_empty() {
            bail!("Database host cannot be empty");
        }
        if self.port == 0 {
            bail!("Database port must be greater than 0");
        }
        if self.user.trim().is_empty() {
            bail!("Database user cannot be empty");
        }
        if self.database.trim().is_empty() {
            bail!("Database name cannot be empty");
        }
        Ok(())
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// What the batch driver does after moving a failed file to rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the batch and surface the error; later files stay in the inbox.
    #[default]
    Halt,
    /// Keep going with the remaining files and report every reject at the end.
    Continue,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "halt" => Ok(FailurePolicy::Halt),
            "continue" => Ok(FailurePolicy::Continue),
            _ => Err(anyhow::anyhow!("Invalid failure policy: {}", s)),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Halt => write!(f, "halt"),
            FailurePolicy::Continue => write!(f, "continue"),
        }
    }
}

/// Where input files live and how the batch reacts to failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub data_root: PathBuf,
    pub ingredient_file: String,
    pub snapshot_prefix: String,
    pub policy: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_ROOT)
    }
}

impl PipelineConfig {
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            ingredient_file: INGREDIENT_FILE.to_string(),
            snapshot_prefix: SNAPSHOT_PREFIX.to_string(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn inbox(&self) -> PathBuf {
        self.data_root.join(INBOX_DIR)
    }

    pub fn processed(&self) -> PathBuf {
        self.data_root.join(PROCESSED_DIR)
    }

    pub fn rejects(&self) -> PathBuf {
        self.data_root.join(REJECTS_DIR)
    }

    pub fn ingredient_path(&self) -> PathBuf {
        self.inbox().join(&self.ingredient_file)
    }

    /// True for file names like `inventory_snapshot_2024-01-01.csv`.
    pub fn is_snapshot_file(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| {
                name.len() >= self.snapshot_prefix.len() + SNAPSHOT_EXTENSION.len()
                    && name.starts_with(&self.snapshot_prefix)
                    && name.ends_with(SNAPSHOT_EXTENSION)
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> DbConfig {
        DbConfig {
            host: "db".to_string(),
            port: 5432,
            user: "etl".to_string(),
            password: "hunter2".to_string(),
            database: "pantry".to_string(),
        }
    }

    #[test]
    fn test_db_config_valid() {
        assert!(db().validate().is_ok());
    }

    #[test]
    fn test_db_config_rejects_zero_port() {
        let config = DbConfig { port: 0, ..db() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_db_config_rejects_empty_database() {
        let config = DbConfig {
            database: " ".to_string(),
            ..db()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_db_config_debug_hides_password() {
        let debug = format!("{:?}", db());
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!("halt".parse::<FailurePolicy>().unwrap(), FailurePolicy::Halt);
        assert_eq!(
            "Continue".parse::<FailurePolicy>().unwrap(),
            FailurePolicy::Continue
        );
        assert!("retry".parse::<FailurePolicy>().is_err());
        assert!("skip".parse::<FailurePolicy>().is_err());
    }

    #[test]
    fn test_directory_layout() {
        let config = PipelineConfig::new("/data");
        assert_eq!(config.inbox(), PathBuf::from("/data/inbox"));
        assert_eq!(config.processed(), PathBuf::from("/data/processed"));
        assert_eq!(config.rejects(), PathBuf::from("/data/rejects"));
        assert_eq!(
            config.ingredient_path(),
            PathBuf::from("/data/inbox/ingredients.csv")
        );
    }

    #[test]
    fn test_snapshot_file_pattern() {
        let config = PipelineConfig::default();
        assert!(config.is_snapshot_file(Path::new("inventory_snapshot_2024-01-01.csv")));
        assert!(config.is_snapshot_file(Path::new("/x/inventory_snapshot_a.csv")));
        assert!(!config.is_snapshot_file(Path::new("ingredients.csv")));
        assert!(!config.is_snapshot_file(Path::new("inventory_snapshot_2024.txt")));
        assert!(!config.is_snapshot_file(Path::new("old_inventory_snapshot_1.csv")));
    }
}
