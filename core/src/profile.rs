use std::path::Path;

use chrono::Local;
use rusqlite::{Connection, params};
use tracing::info;

use crate::error::{Error, Result};
use crate::models::{NotificationPrefs, Session};

const KEY_FIRST_NAME: &str = "first_name";
const KEY_EMAIL: &str = "email";
const KEY_PHONE: &str = "phone";
const KEY_PROFILE_IMAGE: &str = "profile_image";
const KEY_ONBOARDING_COMPLETED: &str = "onboarding_completed";
const KEY_NOTIFY_ORDER_STATUSES: &str = "notify.order_statuses";
const KEY_NOTIFY_PASSWORD_CHANGES: &str = "notify.password_changes";
const KEY_NOTIFY_SPECIAL_OFFERS: &str = "notify.special_offers";
const KEY_NOTIFY_NEWSLETTER: &str = "notify.newsletter";

/// Key-value store for the signed-in user's profile, kept apart from the
/// menu cache.
pub struct ProfileStore {
    conn: Connection,
}

impl ProfileStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .map_err(|source| Error::storage_init(path.display().to_string(), source))?;
        Self::with_connection(conn, &path.display().to_string())
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|source| Error::storage_init(":memory:", source))?;
        Self::with_connection(conn, ":memory:")
    }

    fn with_connection(conn: Connection, location: &str) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS profile (
                key TEXT PRIMARY KEY NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )
        .map_err(|source| Error::storage_init(location, source))?;
        Ok(Self { conn })
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO profile (key, value, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .map_err(|source| Error::StorageWrite {
                target: format!("profile key {key}"),
                source,
            })?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM profile WHERE key = ?1")
            .map_err(Error::StorageRead)?;
        let mut rows = stmt.query(params![key]).map_err(Error::StorageRead)?;
        match rows.next().map_err(Error::StorageRead)? {
            Some(row) => Ok(Some(row.get(0).map_err(Error::StorageRead)?)),
            None => Ok(None),
        }
    }

    pub fn delete(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM profile WHERE key = ?1", params![key])
            .map_err(|source| Error::StorageWrite {
                target: format!("profile key {key}"),
                source,
            })?;
        Ok(rows > 0)
    }

    fn get_flag(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.as_deref() == Some("true"))
    }

    fn set_optional(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(v) => self.set(key, v),
            None => self.delete(key).map(|_| ()),
        }
    }

    /// Load the stored session. Missing keys load as `None`, missing flags
    /// as `false`.
    pub fn load_session(&self) -> Result<Session> {
        Ok(Session {
            first_name: self.get(KEY_FIRST_NAME)?,
            email: self.get(KEY_EMAIL)?,
            phone: self.get(KEY_PHONE)?,
            profile_image: self.get(KEY_PROFILE_IMAGE)?,
            notifications: NotificationPrefs {
                order_statuses: self.get_flag(KEY_NOTIFY_ORDER_STATUSES)?,
                password_changes: self.get_flag(KEY_NOTIFY_PASSWORD_CHANGES)?,
                special_offers: self.get_flag(KEY_NOTIFY_SPECIAL_OFFERS)?,
                newsletter: self.get_flag(KEY_NOTIFY_NEWSLETTER)?,
            },
            onboarding_completed: self.get_flag(KEY_ONBOARDING_COMPLETED)?,
        })
    }

    fn begin(&self) -> Result<rusqlite::Transaction<'_>> {
        self.conn
            .unchecked_transaction()
            .map_err(|source| Error::StorageWrite {
                target: "profile".to_string(),
                source,
            })
    }

    fn commit(tx: rusqlite::Transaction<'_>) -> Result<()> {
        tx.commit().map_err(|source| Error::StorageWrite {
            target: "profile".to_string(),
            source,
        })
    }

    /// Persist every field of `session` in one transaction. `None` fields
    /// remove their key.
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let tx = self.begin()?;
        self.set_optional(KEY_FIRST_NAME, session.first_name.as_deref())?;
        self.set_optional(KEY_EMAIL, session.email.as_deref())?;
        self.set_optional(KEY_PHONE, session.phone.as_deref())?;
        self.set_optional(KEY_PROFILE_IMAGE, session.profile_image.as_deref())?;

        let n = session.notifications;
        for (key, on) in [
            (KEY_NOTIFY_ORDER_STATUSES, n.order_statuses),
            (KEY_NOTIFY_PASSWORD_CHANGES, n.password_changes),
            (KEY_NOTIFY_SPECIAL_OFFERS, n.special_offers),
            (KEY_NOTIFY_NEWSLETTER, n.newsletter),
            (KEY_ONBOARDING_COMPLETED, session.onboarding_completed),
        ] {
            self.set(key, if on { "true" } else { "false" })?;
        }
        Self::commit(tx)
    }

    /// Remove every profile entry and mark onboarding as not completed.
    pub fn clear(&self) -> Result<()> {
        let tx = self.begin()?;
        let removed = self
            .conn
            .execute("DELETE FROM profile", [])
            .map_err(|source| Error::StorageWrite {
                target: "profile".to_string(),
                source,
            })?;
        self.set(KEY_ONBOARDING_COMPLETED, "false")?;
        Self::commit(tx)?;
        info!(removed, "profile cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let store = ProfileStore::open_in_memory().unwrap();
        assert!(store.get("first_name").unwrap().is_none());

        store.set("first_name", "Tilly").unwrap();
        assert_eq!(store.get("first_name").unwrap().as_deref(), Some("Tilly"));

        store.set("first_name", "Adrian").unwrap();
        assert_eq!(store.get("first_name").unwrap().as_deref(), Some("Adrian"));

        assert!(store.delete("first_name").unwrap());
        assert!(!store.delete("first_name").unwrap());
    }

    #[test]
    fn test_empty_store_loads_default_session() {
        let store = ProfileStore::open_in_memory().unwrap();
        assert_eq!(store.load_session().unwrap(), Session::default());
    }

    #[test]
    fn test_save_and_load_session() {
        let store = ProfileStore::open_in_memory().unwrap();
        let session = Session::default()
            .with_first_name("Tilly")
            .with_email("tilly@example.com")
            .with_notifications(NotificationPrefs {
                order_statuses: true,
                special_offers: true,
                ..Default::default()
            })
            .completed_onboarding();
        store.save_session(&session).unwrap();

        let loaded = store.load_session().unwrap();
        assert_eq!(loaded, session);
        assert!(loaded.phone.is_none());
    }

    #[test]
    fn test_save_none_removes_key() {
        let store = ProfileStore::open_in_memory().unwrap();
        let session = Session::default().with_phone(Some("3125550147".to_string()));
        store.save_session(&session).unwrap();
        assert!(store.get("phone").unwrap().is_some());

        store.save_session(&session.with_phone(None)).unwrap();
        assert!(store.get("phone").unwrap().is_none());
    }

    #[test]
    fn test_clear_resets_onboarding() {
        let store = ProfileStore::open_in_memory().unwrap();
        store
            .save_session(&Session::default().with_first_name("Tilly").completed_onboarding())
            .unwrap();
        store.clear().unwrap();

        let loaded = store.load_session().unwrap();
        assert!(loaded.first_name.is_none());
        assert!(!loaded.onboarding_completed);
        assert_eq!(
            store.get("onboarding_completed").unwrap().as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.db");
        ProfileStore::open(&path)
            .unwrap()
            .set("email", "tilly@example.com")
            .unwrap();
        let store = ProfileStore::open(&path).unwrap();
        assert_eq!(
            store.get("email").unwrap().as_deref(),
            Some("tilly@example.com")
        );
    }

    #[test]
    fn test_save_session_failure_leaves_profile_untouched() {
        let store = ProfileStore::open_in_memory().unwrap();
        store
            .conn
            .execute_batch(
                "CREATE TRIGGER reject_newsletter BEFORE INSERT ON profile
                 WHEN NEW.key = 'notify.newsletter'
                 BEGIN SELECT RAISE(ABORT, 'newsletter flag rejected'); END;",
            )
            .unwrap();

        let session = Session::default()
            .with_first_name("Tilly")
            .with_email("tilly@example.com")
            .completed_onboarding();
        let err = store.save_session(&session).unwrap_err();
        assert!(err.to_string().contains("notify.newsletter"));

        assert!(store.get(KEY_FIRST_NAME).unwrap().is_none());
        assert!(store.get(KEY_EMAIL).unwrap().is_none());
        assert!(!store.load_session().unwrap().onboarding_completed);
    }
}
