use std::path::Path;

use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::MenuItem;

/// Local menu table. Rows are written once after the first successful
/// fetch and only removed by [`Database::clear_all`].
pub struct Database {
    conn: Connection,
    location: String,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let location = path.display().to_string();
        let conn =
            Connection::open(path).map_err(|source| Error::storage_init(location.clone(), source))?;
        let db = Database { conn, location };
        db.initialize()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|source| Error::storage_init(":memory:", source))?;
        let db = Database {
            conn,
            location: ":memory:".to_string(),
        };
        db.initialize()?;
        Ok(db)
    }

    /// Ensure the schema exists. Safe to call on every start.
    pub fn initialize(&self) -> Result<()> {
        self.migrate()
            .map_err(|source| Error::storage_init(self.location.clone(), source))
    }

    fn migrate(&self) -> rusqlite::Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS menu (
                    id INTEGER PRIMARY KEY NOT NULL,
                    title TEXT,
                    description TEXT,
                    price TEXT,
                    image TEXT,
                    category TEXT
                );

                PRAGMA user_version = 1;",
            )?;
        }

        if version < 2 {
            self.conn.execute_batch(
                "CREATE INDEX IF NOT EXISTS idx_menu_category ON menu(category);

                PRAGMA user_version = 2;",
            )?;
        }

        Ok(())
    }

    fn item_from_row(row: &rusqlite::Row) -> rusqlite::Result<MenuItem> {
        Ok(MenuItem {
            id: row.get(0)?,
            title: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
            description: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            price: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
            image: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
            category: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        })
    }

    /// Insert every item inside one transaction.
    ///
    /// All-or-nothing: the first failing row rolls back the whole batch and
    /// is named in the returned [`Error::StorageWrite`].
    pub fn insert_all(&self, items: &[MenuItem]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction().map_err(|source| Error::StorageWrite {
            target: "menu batch".to_string(),
            source,
        })?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO menu (id, title, description, price, image, category)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(|source| Error::StorageWrite {
                    target: "menu batch".to_string(),
                    source,
                })?;
            for item in items {
                stmt.execute(params![
                    item.id,
                    item.title,
                    item.description,
                    item.price,
                    item.image,
                    item.category,
                ])
                .map_err(|source| Error::StorageWrite {
                    target: format!("menu item {} ({})", item.id, item.title),
                    source,
                })?;
            }
        }
        tx.commit().map_err(|source| Error::StorageWrite {
            target: "menu batch".to_string(),
            source,
        })?;
        info!(count = items.len(), "menu rows inserted");
        Ok(items.len())
    }

    pub fn query_all(&self) -> Result<Vec<MenuItem>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, title, description, price, image, category FROM menu ORDER BY id")
            .map_err(Error::StorageRead)?;
        let items = stmt
            .query_map([], Self::item_from_row)
            .map_err(Error::StorageRead)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::StorageRead)?;
        debug!(count = items.len(), "menu rows loaded");
        Ok(items)
    }

    /// Rows whose title contains `term`, ignoring ASCII case.
    pub fn query_search(&self, term: &str) -> Result<Vec<MenuItem>> {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{escaped}%");
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, title, description, price, image, category FROM menu
                 WHERE title LIKE ?1 ESCAPE '\\' ORDER BY id",
            )
            .map_err(Error::StorageRead)?;
        let items = stmt
            .query_map(params![pattern], Self::item_from_row)
            .map_err(Error::StorageRead)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(Error::StorageRead)?;
        debug!(term, count = items.len(), "menu search");
        Ok(items)
    }

    pub fn count(&self) -> Result<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM menu", [], |row| row.get(0))
            .map_err(Error::StorageRead)
    }

    /// Delete every row. Returns the number removed; clearing an empty
    /// table succeeds with 0.
    pub fn clear_all(&self) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM menu", [])
            .map_err(|source| Error::StorageWrite {
                target: "menu table".to_string(),
                source,
            })?;
        info!(removed, "menu cleared");
        Ok(removed)
    }
}
