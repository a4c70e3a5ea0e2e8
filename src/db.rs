use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Durable string key-value storage.
pub trait TermStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {}", dir.display()))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("opening database at {}", path.display()))?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

impl TermStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().map_err(|_| anyhow!("Failed to lock database connection"))?;
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().map_err(|_| anyhow!("Failed to lock database connection"))?;
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;

        Ok(())
    }
}

/// A string loaded once from a [`TermStore`] and written back on every change.
///
/// An empty stored value counts as absent and yields the default.
/// The initial value, whether it came from the store or the default, is never
/// written back; only later changes are.
pub struct SemiPersistentTerm<S: TermStore> {
    store: S,
    key: String,
    value: String,
}

impl<S: TermStore> SemiPersistentTerm<S> {
    pub fn load(store: S, key: &str, default: &str) -> Self {
        let value = match store.get(key) {
            Ok(Some(value)) if !value.is_empty() => value,
            Ok(_) => default.to_string(),
            Err(e) => {
                warn!("Failed to read '{}' from store: {}", key, e);
                default.to_string()
            }
        };

        Self {
            store,
            key: key.to_string(),
            value,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: &str) {
        if self.value == value {
            return;
        }

        self.value = value.to_string();
        if let Err(e) = self.store.set(&self.key, &self.value) {
            warn!("Failed to persist '{}': {}", self.key, e);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Store that records every write, for asserting on write-back behavior.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingStore {
        pub values: Rc<RefCell<HashMap<String, String>>>,
        pub writes: Rc<RefCell<Vec<(String, String)>>>,
    }

    impl TermStore for RecordingStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.values.borrow_mut().insert(key.to_string(), value.to_string());
            self.writes.borrow_mut().push((key.to_string(), value.to_string()));
            Ok(())
        }
    }

    struct BrokenStore;

    impl TermStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    #[test]
    fn get_missing_key_is_none() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.get("search").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let db = Database::in_memory().unwrap();
        db.set("search", "Vue").unwrap();
        db.set("search", "Svelte").unwrap();

        assert_eq!(db.get("search").unwrap().as_deref(), Some("Svelte"));
    }

    #[test]
    fn value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stories.db");

        {
            let db = Database::open(&path).unwrap();
            let mut term = SemiPersistentTerm::load(db, "search", "React");
            term.set("Angular");
        }

        let db = Database::open(&path).unwrap();
        let term = SemiPersistentTerm::load(db, "search", "React");
        assert_eq!(term.value(), "Angular");
    }

    #[test]
    fn first_run_uses_default() {
        let db = Database::in_memory().unwrap();
        let term = SemiPersistentTerm::load(db, "search", "React");

        assert_eq!(term.value(), "React");
    }

    #[test]
    fn initial_value_is_not_written_back() {
        let store = RecordingStore::default();
        let term = SemiPersistentTerm::load(store.clone(), "search", "React");

        assert_eq!(term.value(), "React");
        assert!(store.writes.borrow().is_empty());
    }

    #[test]
    fn only_changes_are_written() {
        let store = RecordingStore::default();
        let mut term = SemiPersistentTerm::load(store.clone(), "search", "React");

        term.set("React");
        term.set("Redux");
        term.set("Redux");
        term.set("");

        assert_eq!(
            *store.writes.borrow(),
            vec![
                ("search".to_string(), "Redux".to_string()),
                ("search".to_string(), "".to_string()),
            ]
        );
    }

    #[test]
    fn empty_stored_value_yields_default() {
        let db = Database::in_memory().unwrap();
        db.set("search", "").unwrap();

        let term = SemiPersistentTerm::load(db, "search", "React");
        assert_eq!(term.value(), "React");
    }

    #[test]
    fn store_failures_fall_back_to_memory() {
        let mut term = SemiPersistentTerm::load(BrokenStore, "search", "React");
        assert_eq!(term.value(), "React");

        term.set("Ember");
        assert_eq!(term.value(), "Ember");
    }
}
