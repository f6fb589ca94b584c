use std::collections::HashMap;
use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::Config;
use crate::error::StorageError;

pub const STUDENTS_KEY: &str = "students_data";
pub const ANNOUNCEMENTS_KEY: &str = "announcements_data";
pub const INITIALIZED_KEY: &str = "student_data_initialized";

/// String-valued persistent storage. Values are opaque to the backend.
pub trait KeyValueStore {
    fn get(&self, key: &str)
        -> impl Future<Output = Result<Option<String>, StorageError>> + Send;

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<(), StorageError>> + Send;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| StorageError::Io {
                key: dir.display().to_string(),
                source,
            })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            key: key.to_string(),
            source,
        };
        // Replace via rename so a failed write never leaves a truncated value behind.
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        tokio::fs::write(&tmp, value).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, self.path_for(key))
            .await
            .map_err(io_err)?;
        debug!(key, bytes = value.len(), "wrote storage file");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

impl KeyValueStore for PgStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM roster.kv_entries WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(row.try_get("value")?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO roster.kv_entries (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// The backend chosen from configuration.
#[derive(Debug, Clone)]
pub enum Backend {
    File(FileStore),
    Postgres(PgStore),
}

impl Backend {
    pub async fn from_config(config: &Config) -> Result<Self, StorageError> {
        match &config.database_url {
            Some(url) => Ok(Backend::Postgres(PgStore::connect(url).await?)),
            None => Ok(Backend::File(FileStore::open(&config.data_dir).await?)),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Backend::File(store) => format!("files in {}", store.dir().display()),
            Backend::Postgres(_) => "postgres".to_string(),
        }
    }
}

impl KeyValueStore for Backend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Backend::File(store) => store.get(key).await,
            Backend::Postgres(store) => store.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Backend::File(store) => store.set(key, value).await,
            Backend::Postgres(store) => store.set(key, value).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_returns_none_for_missing_keys() {
        let store = MemoryStore::new();
        assert_eq!(store.get(STUDENTS_KEY).await.unwrap(), None);

        store.set(STUDENTS_KEY, "[]").await.unwrap();
        assert_eq!(store.get(STUDENTS_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn file_store_persists_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let first = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(first.get(INITIALIZED_KEY).await.unwrap(), None);
        first.set(INITIALIZED_KEY, "true").await.unwrap();
        first.set(INITIALIZED_KEY, "false").await.unwrap();

        let second = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(
            second.get(INITIALIZED_KEY).await.unwrap().as_deref(),
            Some("false")
        );
        assert!(!dir.path().join(".student_data_initialized.json.tmp").exists());
    }

    #[tokio::test]
    async fn file_store_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("roster");
        let store = FileStore::open(&nested).await.unwrap();

        store.set(ANNOUNCEMENTS_KEY, "[]").await.unwrap();
        assert!(nested.join("announcements_data.json").exists());
    }
}
