use crate::api::models::ChatTurn;
use crate::error::StorageError;
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::{Path, PathBuf};

pub const HISTORY_KEY: &str = "svu_chat_history";
pub const THEME_KEY: &str = "svu_theme";

/// Flat string key-value persistence, the same shape as browser local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

fn db_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("com", "example", "CampusAssistant")?;
    Some(proj.data_dir().join("store.sqlite"))
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the store in the platform data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        let path = db_path().ok_or(StorageError::NoDataDir)?;
        Self::open(&path)
    }

    pub fn open(path: &Path) -> Result<Self, StorageError> {
        ensure_dir(path)?;
        let conn = Connection::open(path)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |_| Ok(()))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(Self { conn })
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for std::rc::Rc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// The saved conversation, stored as one JSON array under [`HISTORY_KEY`].
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Missing, unreadable or malformed history all load as empty.
    pub fn load(&self) -> Vec<ChatTurn> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Could not read chat history: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<ChatTurn>>(&raw) {
            Ok(turns) => turns,
            Err(e) => {
                log::warn!("Discarding malformed chat history: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save(&self, turns: &[ChatTurn]) -> Result<(), StorageError> {
        let json = serde_json::to_string(turns)?;
        self.store.set(HISTORY_KEY, &json)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(HISTORY_KEY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Label for the button that switches away from this theme.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Theme::Dark => "Light Mode",
            Theme::Light => "Dark Mode",
        }
    }
}

pub struct ThemeStore<S> {
    store: S,
}

impl<S: KeyValueStore> ThemeStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Theme {
        match self.store.get(THEME_KEY) {
            Ok(Some(v)) if v == "dark" => Theme::Dark,
            Ok(_) => Theme::Light,
            Err(e) => {
                log::warn!("Could not read theme preference: {}", e);
                Theme::Light
            }
        }
    }

    pub fn save(&self, theme: Theme) {
        if let Err(e) = self.store.set(THEME_KEY, theme.as_str()) {
            log::warn!("Could not save theme preference: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn kv_set_get_remove() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn history_round_trips_in_order() {
        let history = HistoryStore::new(SqliteStore::open_in_memory().unwrap());
        let turns = vec![
            ChatTurn::user("Where is the library?"),
            ChatTurn::bot("Near the **main gate**."),
            ChatTurn::user("Thanks"),
        ];
        history.save(&turns).unwrap();
        assert_eq!(history.load(), turns);
    }

    #[test]
    fn malformed_history_loads_empty() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        store.set(HISTORY_KEY, "[{\"text\": 1").unwrap();
        assert!(HistoryStore::new(store.clone()).load().is_empty());
        store.set(HISTORY_KEY, r#"[{"text":"hi","sender":"robot"}]"#).unwrap();
        assert!(HistoryStore::new(store).load().is_empty());
    }

    #[test]
    fn cleared_history_loads_empty() {
        let history = HistoryStore::new(SqliteStore::open_in_memory().unwrap());
        history.save(&[ChatTurn::user("hi")]).unwrap();
        history.clear().unwrap();
        assert!(history.load().is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.sqlite");
        {
            let history = HistoryStore::new(SqliteStore::open(&path).unwrap());
            history.save(&[ChatTurn::user("hello"), ChatTurn::bot("hi there")]).unwrap();
        }
        let history = HistoryStore::new(SqliteStore::open(&path).unwrap());
        assert_eq!(history.load().len(), 2);
    }

    #[test]
    fn unusable_parent_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let result = SqliteStore::open(&blocker.join("store.sqlite"));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn theme_defaults_to_light_and_persists() {
        let store = Rc::new(SqliteStore::open_in_memory().unwrap());
        let themes = ThemeStore::new(store.clone());
        assert_eq!(themes.load(), Theme::Light);
        themes.save(Theme::Dark);
        assert_eq!(store.get(THEME_KEY).unwrap().as_deref(), Some("dark"));
        assert_eq!(themes.load(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.toggle_label(), "Dark Mode");
    }
}
