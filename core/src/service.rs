use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::filter::{self, MenuFilter, SearchOutcome};
use crate::models::{self, MenuItem, ProfileUpdate, Session};
use crate::profile::ProfileStore;
use crate::remote::MenuSource;
use crate::sync::{MenuListener, MenuOrigin, MenuSync, SyncState};

/// The menu store, or the reason it could not be opened.
enum MenuStore {
    Open(Database),
    Unavailable {
        location: String,
        source: Arc<rusqlite::Error>,
    },
}

impl MenuStore {
    fn open(path: &Path) -> Result<Self> {
        match Database::open(path) {
            Ok(db) => Ok(Self::Open(db)),
            Err(Error::StorageInit { location, source }) => {
                warn!(%location, error = %source, "menu store unavailable, menu features disabled");
                Ok(Self::Unavailable { location, source })
            }
            Err(err) => Err(err),
        }
    }

    fn get(&self) -> Result<&Database> {
        match self {
            Self::Open(db) => Ok(db),
            Self::Unavailable { location, source } => Err(Error::StorageInit {
                location: location.clone(),
                source: Arc::clone(source),
            }),
        }
    }
}

/// Everything a screen needs: the menu cache, its sync controller and the
/// profile store. Screens receive this by reference instead of threading
/// individual fields and callbacks.
///
/// A menu store that fails to open only disables the menu operations; the
/// profile keeps working.
pub struct BistroService {
    menu: MenuStore,
    profile: ProfileStore,
    sync: MenuSync,
}

impl BistroService {
    pub fn new(menu_db: &Path, profile_db: &Path) -> Result<Self> {
        Ok(Self {
            profile: ProfileStore::open(profile_db)?,
            menu: MenuStore::open(menu_db)?,
            sync: MenuSync::new(),
        })
    }

    pub fn new_in_memory() -> Result<Self> {
        Ok(Self {
            menu: MenuStore::Open(Database::open_in_memory()?),
            profile: ProfileStore::open_in_memory()?,
            sync: MenuSync::new(),
        })
    }

    pub fn subscribe(&mut self, listener: impl MenuListener + 'static) {
        self.sync.subscribe(listener);
    }

    // --- Menu ---

    pub async fn start<S: MenuSource>(&self, source: &S) -> Result<MenuOrigin> {
        let db = match self.menu.get() {
            Ok(db) => db,
            Err(err) => {
                self.sync.publish_failure(&err);
                return Err(err);
            }
        };
        self.sync.start(db, source).await
    }

    #[must_use]
    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    #[must_use]
    pub fn menu(&self) -> Vec<MenuItem> {
        self.sync.published()
    }

    pub fn search(&self, filter: &MenuFilter) -> Result<SearchOutcome> {
        self.sync.search(self.menu.get()?, filter)
    }

    pub fn categories(&self) -> Result<Vec<String>> {
        self.menu.get()?;
        Ok(filter::categories(&self.sync.published()))
    }

    pub fn cached_item_count(&self) -> Result<i64> {
        self.menu.get()?.count()
    }

    // --- Profile ---

    pub fn session(&self) -> Result<Session> {
        self.profile.load_session()
    }

    pub fn is_onboarded(&self) -> Result<bool> {
        Ok(self.profile.load_session()?.onboarding_completed)
    }

    /// Validate the onboarding form and start a session.
    pub fn onboard(&self, first_name: &str, email: &str) -> Result<Session> {
        models::validate_onboarding(first_name, email)?;
        let session = self
            .profile
            .load_session()?
            .with_first_name(first_name)
            .with_email(email)
            .completed_onboarding();
        self.profile.save_session(&session)?;
        info!("onboarding completed");
        Ok(session)
    }

    pub fn update_profile(&self, update: &ProfileUpdate) -> Result<Session> {
        models::validate_profile_update(update)?;
        let session = self.profile.load_session()?.apply(update);
        self.profile.save_session(&session)?;
        Ok(session)
    }

    /// Forget the user and the cached menu. The next start re-seeds.
    ///
    /// The published menu is dropped and the profile cleared even when the
    /// menu table cannot be cleared; that error is returned afterwards.
    pub fn logout(&self) -> Result<()> {
        let menu_cleared = match &self.menu {
            MenuStore::Open(db) => db.clear_all().map(|_| ()),
            MenuStore::Unavailable { location, .. } => {
                warn!(%location, "menu store unavailable, nothing to clear");
                Ok(())
            }
        };
        self.sync.reset();
        self.profile.clear()?;
        match menu_cleared {
            Ok(_) => {
                info!("logged out");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "logged out, but the menu cache was not cleared");
                Err(err)
            }
        }
    }
}
