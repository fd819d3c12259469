//! Error types for the menu cache, remote fetch and profile storage.
//!
//! Every variant is recoverable at the UI boundary: callers render an
//! empty or error state rather than aborting.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::models::ValidationErrors;

#[derive(Error, Debug)]
pub enum Error {
    /// The store could not be opened or its schema statement failed. The
    /// source is shared so a store that failed to open can keep reporting
    /// the same cause.
    #[error("failed to initialize storage at {location}: {source}")]
    StorageInit {
        location: String,
        #[source]
        source: Arc<rusqlite::Error>,
    },

    /// A write failed. `target` names the row or key that was being written.
    #[error("failed to write {target}: {source}")]
    StorageWrite {
        target: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to read from storage: {0}")]
    StorageRead(#[source] rusqlite::Error),

    /// No connectivity, timeout, or a non-2xx response.
    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Malformed JSON or a document without the expected shape.
    #[error("could not parse menu document: {0}")]
    Parse(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("a menu sync is already in progress")]
    SyncInFlight,
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Coarse classification of an [`Error`], carried by UI-facing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    StorageInit,
    StorageWrite,
    StorageRead,
    Network,
    Parse,
    Validation,
    SyncInFlight,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StorageInit => "storage_init",
            Self::StorageWrite => "storage_write",
            Self::StorageRead => "storage_read",
            Self::Network => "network",
            Self::Parse => "parse",
            Self::Validation => "validation",
            Self::SyncInFlight => "sync_in_flight",
        };
        f.write_str(s)
    }
}

impl Error {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::StorageInit { .. } => ErrorKind::StorageInit,
            Self::StorageWrite { .. } => ErrorKind::StorageWrite,
            Self::StorageRead(_) => ErrorKind::StorageRead,
            Self::Network { .. } => ErrorKind::Network,
            Self::Parse(_) => ErrorKind::Parse,
            Self::Validation(_) => ErrorKind::Validation,
            Self::SyncInFlight => ErrorKind::SyncInFlight,
        }
    }

    #[must_use]
    pub fn network(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn storage_init(location: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::StorageInit {
            location: location.into(),
            source: Arc::new(source),
        }
    }

    #[must_use]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Whether the menu store itself is unusable (as opposed to the remote
    /// being unreachable). Menu features stay disabled until restart.
    #[must_use]
    pub fn is_storage_init(&self) -> bool {
        matches!(self, Self::StorageInit { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_error_display() {
        let err = Error::network("https://example.com/menu.json", "HTTP 503");
        let msg = err.to_string();
        assert!(msg.contains("https://example.com/menu.json"));
        assert!(msg.contains("HTTP 503"));
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_from_json_error_is_parse() {
        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: Error = json_err.into();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn test_storage_write_names_target() {
        let err = Error::StorageWrite {
            target: "menu item 3 (Lemon Dessert)".to_string(),
            source: rusqlite::Error::QueryReturnedNoRows,
        };
        assert!(err.to_string().contains("menu item 3 (Lemon Dessert)"));
        assert!(!err.is_storage_init());
    }

    #[test]
    fn test_storage_init_clones_share_source() {
        let err = Error::storage_init("/data/menu.db", rusqlite::Error::InvalidQuery);
        let Error::StorageInit { location, source } = &err else {
            panic!("expected StorageInit, got {err:?}");
        };
        let again = Error::StorageInit {
            location: location.clone(),
            source: Arc::clone(source),
        };
        assert!(again.is_storage_init());
        assert_eq!(again.to_string(), err.to_string());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::StorageInit.to_string(), "storage_init");
        assert_eq!(ErrorKind::SyncInFlight.to_string(), "sync_in_flight");
    }
}
