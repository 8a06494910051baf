//! DraftStore - durable session storage for draftdaemon
//!
//! Persists workflow sessions as JSON documents keyed by session id. The
//! daemon injects a [`SessionStore`] into its orchestrator; nothing in this
//! crate knows about workflow stages or document types, it only moves opaque
//! JSON payloads in and out of a backend.
//!
//! # Layout
//!
//! ```text
//! {sessions-dir}/
//! ├── .lock                       # advisory write lock
//! ├── 4f9a2c-session-nda.json
//! └── 8b01de-session-msa.json
//! ```
//!
//! # Example
//!
//! ```ignore
//! use draftstore::SessionStore;
//!
//! let store = SessionStore::open("~/.local/share/draftdaemon/sessions")?;
//! store.set("4f9a2c-session-nda", &session)?;
//! let session: Option<Session> = store.get("4f9a2c-session-nda")?;
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{FileStore, MemoryStore, SessionId, SessionStore, StoreBackend, StoreError};

/// Current unix time in milliseconds
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
