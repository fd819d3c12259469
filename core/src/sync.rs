//! Seed-once menu sync.
//!
//! On start the controller serves the local store if it has rows, otherwise
//! fetches the remote document once, writes it through and publishes it.
//! There is no refresh: once seeded, the store stays the source of truth
//! until it is cleared.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{Error, ErrorKind, Result};
use crate::filter::{self, MenuFilter, SearchOutcome};
use crate::models::MenuItem;
use crate::remote::MenuSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Syncing,
    Ready,
}

/// Where the published menu came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuOrigin {
    Store,
    Remote,
    /// Fetched, but writing it to the store failed. The next start fetches
    /// again.
    RemoteUncached,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEvent {
    Ready(Vec<MenuItem>),
    Error { kind: ErrorKind, message: String },
    SearchResult(SearchOutcome),
}

impl MenuEvent {
    fn error(err: &Error) -> Self {
        Self::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

pub trait MenuListener: Send {
    fn on_event(&self, event: &MenuEvent);
}

impl<F> MenuListener for F
where
    F: Fn(&MenuEvent) + Send,
{
    fn on_event(&self, event: &MenuEvent) {
        self(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks a sync as running. Only one guard can exist per flag; dropping it,
/// including by abandoning the sync future, clears the flag.
struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlight<'a> {
    fn begin(flag: &'a AtomicBool) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::SyncInFlight);
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

struct Loaded {
    items: Vec<MenuItem>,
    origin: MenuOrigin,
    write_error: Option<Error>,
}

async fn load_or_seed<S: MenuSource>(db: &Database, source: &S) -> Result<Loaded> {
    db.initialize()?;
    let stored = db.query_all()?;
    if !stored.is_empty() {
        return Ok(Loaded {
            items: stored,
            origin: MenuOrigin::Store,
            write_error: None,
        });
    }

    info!("menu store is empty, fetching remote menu");
    let fetched = source.fetch_menu().await?;
    match db.insert_all(&fetched) {
        Ok(_) => Ok(Loaded {
            items: fetched,
            origin: MenuOrigin::Remote,
            write_error: None,
        }),
        Err(err) => Ok(Loaded {
            items: fetched,
            origin: MenuOrigin::RemoteUncached,
            write_error: Some(err),
        }),
    }
}

#[derive(Default)]
struct Published {
    items: Vec<MenuItem>,
    origin: Option<MenuOrigin>,
}

/// Publishes the menu to subscribed listeners. Every operation takes `&self`
/// so overlapping starts on one controller are rejected at runtime by the
/// in-flight flag.
pub struct MenuSync {
    in_flight: AtomicBool,
    published: Mutex<Published>,
    listeners: Mutex<Vec<Box<dyn MenuListener>>>,
}

impl Default for MenuSync {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuSync {
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            published: Mutex::new(Published::default()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&mut self, listener: impl MenuListener + 'static) {
        self.listeners
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(listener));
    }

    fn emit(&self, event: &MenuEvent) {
        for listener in lock(&self.listeners).iter() {
            listener.on_event(event);
        }
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.in_flight.load(Ordering::SeqCst) {
            SyncState::Syncing
        } else if self.origin().is_some() {
            SyncState::Ready
        } else {
            SyncState::Uninitialized
        }
    }

    #[must_use]
    pub fn origin(&self) -> Option<MenuOrigin> {
        lock(&self.published).origin
    }

    /// A copy of the currently published items.
    #[must_use]
    pub fn published(&self) -> Vec<MenuItem> {
        lock(&self.published).items.clone()
    }

    /// Bring the menu to `Ready`, fetching from `source` only when the store
    /// is empty. Once ready, later calls return without I/O. A call made
    /// while another is still syncing fails with [`Error::SyncInFlight`].
    pub async fn start<S: MenuSource>(&self, db: &Database, source: &S) -> Result<MenuOrigin> {
        if let Some(origin) = self.origin() {
            return Ok(origin);
        }
        let flight = InFlight::begin(&self.in_flight)?;

        match load_or_seed(db, source).await {
            Ok(loaded) => {
                if let Some(err) = &loaded.write_error {
                    warn!(error = %err, "fetched menu could not be cached");
                    self.emit(&MenuEvent::error(err));
                }
                info!(count = loaded.items.len(), origin = ?loaded.origin, "menu published");
                *lock(&self.published) = Published {
                    items: loaded.items.clone(),
                    origin: Some(loaded.origin),
                };
                drop(flight);
                self.emit(&MenuEvent::Ready(loaded.items));
                Ok(loaded.origin)
            }
            Err(err) => {
                warn!(error = %err, "menu sync failed");
                drop(flight);
                self.publish_failure(&err);
                Err(err)
            }
        }
    }

    /// Publish an empty menu and report `err` to listeners. The controller
    /// stays `Uninitialized` so a later start retries.
    pub fn publish_failure(&self, err: &Error) {
        *lock(&self.published) = Published::default();
        self.emit(&MenuEvent::Ready(Vec::new()));
        self.emit(&MenuEvent::error(err));
    }

    /// Narrow the menu. A search term re-queries the store; without one the
    /// published set is filtered in memory.
    pub fn search(&self, db: &Database, filter: &MenuFilter) -> Result<SearchOutcome> {
        let candidates = if filter.has_search() {
            match db.query_search(filter.search()) {
                Ok(rows) => rows,
                Err(err) => {
                    warn!(error = %err, "menu search failed");
                    self.emit(&MenuEvent::error(&err));
                    return Err(err);
                }
            }
        } else {
            self.published()
        };
        let outcome = filter::apply_filter(candidates, filter);
        self.emit(&MenuEvent::SearchResult(outcome.clone()));
        Ok(outcome)
    }

    /// Drop the published menu and return to `Uninitialized`.
    pub fn reset(&self) {
        *lock(&self.published) = Published::default();
    }
}
