//! Configuration file handling.
//!
//! Loads `.duckbind.json`, which selects the database backend and the session
//! settings applied to every connection:
//!
//! ```json
//! {
//!   "database": {
//!     "type": "duckdb",
//!     "path": "analytics.db",
//!     "settings": { "threads": "4" },
//!     "seed_rows": 100000
//!   },
//!   "time_zone": "Europe/Berlin",
//!   "max_task_steps": 100000
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connection::Database;
use crate::error::{DuckError, Result};

pub const CONFIG_FILE_NAME: &str = ".duckbind.json";

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseConfig,
    /// IANA zone name for TIMESTAMP WITH TIME ZONE results; UTC when unset
    #[serde(default)]
    pub time_zone: Option<String>,
    /// Step budget for driving pending results to completion
    #[serde(default)]
    pub max_task_steps: Option<u64>,
}

/// Backend selection. JSON uses a lowercase `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// Bundled DuckDB engine
    DuckDb {
        /// Database file; in-memory when unset
        #[serde(default)]
        path: Option<PathBuf>,
        /// Startup options such as `threads` or `memory_limit`
        #[serde(default)]
        settings: BTreeMap<String, String>,
        /// Rows of the demo `large_table`; no table when unset
        #[serde(default)]
        seed_rows: Option<usize>,
    },
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::DuckDb {
            path: None,
            settings: BTreeMap::new(),
            seed_rows: None,
        }
    }
}

impl ConfigFile {
    /// Read and parse one configuration file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| DuckError::config(format!("Failed to read {}: {}", path.display(), e)))?;
        let config: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| DuckError::config(format!("Invalid JSON in {}: {}", path.display(), e)))?;
        config.time_zone()?;
        Ok(config)
    }

    /// Resolve the configuration to use.
    ///
    /// Checks, in order: the explicit path (which must exist),
    /// `./.duckbind.json`, `~/.duckbind.json`. Falls back to defaults when
    /// none is found.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            if !path.exists() {
                return Err(DuckError::config(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
            return Self::from_path(path);
        }

        match Self::discover() {
            Some(path) => {
                debug!(path = %path.display(), "loading configuration");
                Self::from_path(&path)
            }
            None => {
                debug!("no configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        let global = home::home_dir()?.join(CONFIG_FILE_NAME);
        global.exists().then_some(global)
    }

    /// The configured session zone, validated against the tz database.
    pub fn time_zone(&self) -> Result<Tz> {
        match &self.time_zone {
            None => Ok(Tz::UTC),
            Some(name) => name
                .parse::<Tz>()
                .map_err(|_| DuckError::config(format!("unknown time zone '{}'", name))),
        }
    }

    /// Open the configured database with the session settings applied.
    pub fn open(&self) -> Result<Database> {
        let time_zone = self.time_zone()?;
        let db = self
            .database
            .open()?
            .with_time_zone(time_zone)
            .with_max_task_steps(self.max_task_steps);
        Ok(db)
    }
}

impl DatabaseConfig {
    #[cfg(feature = "backend-duckdb")]
    pub fn open(&self) -> Result<Database> {
        use engine::DuckDbOptions;

        match self {
            Self::DuckDb {
                path,
                settings,
                seed_rows,
            } => {
                let native = engine::open_database(&DuckDbOptions {
                    path: path.clone(),
                    settings: settings.clone(),
                })?;
                let db = Database::from_native(native);
                if let Some(rows) = seed_rows {
                    seed::large_table(&db, *rows)?;
                }
                Ok(db)
            }
        }
    }

    #[cfg(not(feature = "backend-duckdb"))]
    pub fn open(&self) -> Result<Database> {
        Err(DuckError::config("no database backend compiled in"))
    }
}

pub mod seed {
    //! Demo data for trying out the CLI.

    use crate::connection::Database;
    use crate::error::Result;

    pub const LARGE_TABLE: &str = "large_table";

    /// (Re)create `large_table(id BIGINT, label VARCHAR, amount DECIMAL(18,2))`
    /// with `rows` rows. Every seventh label is NULL.
    pub fn large_table(db: &Database, rows: usize) -> Result<()> {
        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS \
             SELECT range AS id, \
                    CASE WHEN range % 7 = 0 THEN NULL ELSE 'row-' || range::VARCHAR END AS label, \
                    CAST(range * 1.25 - 500 AS DECIMAL(18,2)) AS amount \
             FROM range({})",
            LARGE_TABLE, rows
        );
        db.connect()?.query(&sql, &[])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_duckdb_deserialization() {
        let json = r#"{ "database": { "type": "duckdb" } }"#;
        let config: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(config.database, DatabaseConfig::default());
        assert_eq!(config.time_zone, None);
    }

    #[test]
    fn test_full_deserialization() {
        let json = r#"
        {
            "database": {
                "type": "duckdb",
                "path": "/tmp/analytics.db",
                "settings": { "threads": "2" },
                "seed_rows": 1000
            },
            "time_zone": "Europe/Berlin",
            "max_task_steps": 50
        }
        "#;
        let config: ConfigFile = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.database,
            DatabaseConfig::DuckDb {
                path: Some(PathBuf::from("/tmp/analytics.db")),
                settings: BTreeMap::from([("threads".to_string(), "2".to_string())]),
                seed_rows: Some(1000),
            }
        );
        assert_eq!(config.time_zone().unwrap(), Tz::Europe__Berlin);
        assert_eq!(config.max_task_steps, Some(50));
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let json = r#"{ "database": { "type": "postgres" } }"#;
        assert!(serde_json::from_str::<ConfigFile>(json).is_err());
    }

    #[test]
    fn test_unknown_time_zone() {
        let config = ConfigFile {
            time_zone: Some("Mars/Olympus_Mons".to_string()),
            ..ConfigFile::default()
        };
        let err = config.time_zone().unwrap_err();
        assert!(matches!(err, DuckError::Config { .. }));
        assert!(err.to_string().contains("Mars/Olympus_Mons"));
    }

    #[test]
    fn test_from_path_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ invalid json }").unwrap();
        file.flush().unwrap();

        let err = ConfigFile::from_path(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid JSON"));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        let err = ConfigFile::load(Some(&missing)).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    #[serial]
    fn test_load_from_current_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            r#"{ "database": { "type": "duckdb", "seed_rows": 16 }, "time_zone": "Asia/Tokyo" }"#,
        )
        .unwrap();

        let old_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();
        let config = ConfigFile::load(None);
        std::env::set_current_dir(old_dir).unwrap();

        let config = config.unwrap();
        assert_eq!(config.time_zone().unwrap(), Tz::Asia__Tokyo);
        assert!(matches!(config.database, DatabaseConfig::DuckDb { seed_rows: Some(16), .. }));
    }

    #[test]
    fn test_open_applies_session_settings() {
        let config = ConfigFile {
            database: DatabaseConfig::DuckDb {
                path: None,
                settings: BTreeMap::new(),
                seed_rows: Some(25),
            },
            time_zone: Some("Europe/Berlin".to_string()),
            max_task_steps: None,
        };
        let db = config.open().unwrap();
        assert_eq!(db.time_zone(), Tz::Europe__Berlin);

        let mut conn = db.connect().unwrap();
        let result = conn.query("SELECT * FROM large_table ORDER BY id", &[]).unwrap();
        assert_eq!(result.row_count(), 25);
        assert_eq!(result.column_count(), 3);
        assert!(result.fetch_row(0, 1).unwrap().is_null());
        assert_eq!(result.fetch_row(24, 0).unwrap(), crate::value::RowValue::Int(24));
    }

    #[test]
    fn test_unknown_setting_rejected() {
        let config = DatabaseConfig::DuckDb {
            path: None,
            settings: BTreeMap::from([("not_a_setting".to_string(), "1".to_string())]),
            seed_rows: None,
        };
        let err = config.open().err().unwrap();
        assert!(err.engine_error().is_some());
        assert!(err.to_string().contains("not_a_setting"));
    }

    #[test]
    fn test_file_database_keeps_seeded_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::DuckDb {
            path: Some(dir.path().join("seeded.db")),
            settings: BTreeMap::new(),
            seed_rows: Some(10),
        };
        drop(config.open().unwrap());

        let reopened = DatabaseConfig::DuckDb {
            path: Some(dir.path().join("seeded.db")),
            settings: BTreeMap::new(),
            seed_rows: None,
        };
        let db = reopened.open().unwrap();
        let mut conn = db.connect().unwrap();
        let result = conn.query("SELECT count(*) FROM large_table", &[]).unwrap();
        assert_eq!(result.fetch_row(0, 0).unwrap(), crate::value::RowValue::Int(10));
    }
}
