//! SQLite-backed settings store

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::application::errors::StorageError;
use crate::domain::entities::{Tag, TagSettings};
use crate::domain::traits::SettingsStore;

const NOTIFY_KEY: &str = "notify_on_send";

pub struct SqliteSettingsStore {
    conn: Mutex<Connection>,
    default_notify_on_send: bool,
}

impl SqliteSettingsStore {
    pub fn open(path: impl AsRef<Path>, default_notify_on_send: bool) -> Result<Self, StorageError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Self::with_connection(Connection::open(path)?, default_notify_on_send)
    }

    pub fn open_in_memory(default_notify_on_send: bool) -> Result<Self, StorageError> {
        Self::with_connection(Connection::open_in_memory()?, default_notify_on_send)
    }

    fn with_connection(conn: Connection, default_notify_on_send: bool) -> Result<Self, StorageError> {
        init_tables(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            default_notify_on_send,
        })
    }
}

fn init_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tags (
            name TEXT PRIMARY KEY NOT NULL,
            message TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl SettingsStore for SqliteSettingsStore {
    fn load(&self) -> Result<TagSettings, StorageError> {
        let conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;

        let notify: Option<String> = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [NOTIFY_KEY], |row| row.get(0))
            .optional()?;
        let notify_on_send = match notify.as_deref() {
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(StorageError::Serialization(format!(
                    "invalid {} value '{}'",
                    NOTIFY_KEY, other
                )))
            }
            None => self.default_notify_on_send,
        };

        let mut stmt = conn.prepare("SELECT name, message FROM tags")?;
        let rows = stmt.query_map([], |row| Ok(Tag::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;

        let mut settings = TagSettings {
            notify_on_send,
            ..TagSettings::default()
        };
        for tag in rows {
            let tag = tag?;
            settings.tags.insert(tag.name.clone(), tag);
        }
        Ok(settings)
    }

    fn save(&self, settings: &TagSettings) -> Result<(), StorageError> {
        let mut conn = self.conn.lock().map_err(|_| StorageError::LockPoisoned)?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM tags", [])?;
        {
            let mut insert = tx.prepare("INSERT INTO tags (name, message) VALUES (?1, ?2)")?;
            for tag in settings.tags.values() {
                insert.execute(params![tag.name, tag.message])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            params![NOTIFY_KEY, settings.notify_on_send.to_string()],
        )?;

        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_database_uses_default() {
        let store = SqliteSettingsStore::open_in_memory(false).unwrap();
        let settings = store.load().unwrap();
        assert!(!settings.notify_on_send);
        assert!(settings.tags.is_empty());
    }

    #[test]
    fn test_save_replaces_everything() {
        let store = SqliteSettingsStore::open_in_memory(true).unwrap();

        let mut settings = TagSettings::default();
        settings.tags.insert("a".into(), Tag::new("a", "1"));
        settings.tags.insert("b".into(), Tag::new("b", "2"));
        store.save(&settings).unwrap();

        settings.tags.remove("a");
        settings.notify_on_send = false;
        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tags.db");

        let mut settings = TagSettings::default();
        settings.tags.insert("greet".into(), Tag::new("greet", "hi\\nthere"));
        SqliteSettingsStore::open(&path, true).unwrap().save(&settings).unwrap();

        let reopened = SqliteSettingsStore::open(&path, true).unwrap();
        assert_eq!(reopened.load().unwrap(), settings);
    }
}
