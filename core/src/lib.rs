//! Local-first menu cache for the bistro companion app.
//!
//! The menu is fetched once from a remote JSON document, written through to
//! SQLite, and served from there afterwards. Searching re-queries the store;
//! category filtering runs over the published set.

pub mod db;
pub mod error;
pub mod filter;
pub mod models;
pub mod profile;
pub mod remote;
pub mod service;
pub mod sync;

pub use error::{Error, ErrorKind, Result};
