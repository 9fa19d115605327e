//! Persisted "logged in" flag and the context that hands it to guards and auth flows.
//!
//! The flag is a client-side trust signal only: it has no expiry and no server-side
//! counterpart, and it stays set until an explicit logout.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("failed to access session file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("session file '{path}' is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait SessionStore: Send + Sync {
    /// `false` when nothing has been persisted yet.
    fn read_flag(&self) -> Result<bool, SessionStoreError>;
    fn write_flag(&self) -> Result<(), SessionStoreError>;
    fn clear_flag(&self) -> Result<(), SessionStoreError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    logged_in: bool,
}

/// Stores the flag as a small JSON document. Writes go through a sibling temp file and a
/// rename so readers never observe a half-written flag.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> SessionStoreError {
        SessionStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SessionStore for FileSessionStore {
    fn read_flag(&self) -> Result<bool, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(self.io_error(err)),
        };
        let persisted: PersistedSession =
            serde_json::from_str(&raw).map_err(|source| SessionStoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        Ok(persisted.logged_in)
    }

    fn write_flag(&self) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let body = serde_json::to_string(&PersistedSession { logged_in: true }).map_err(
            |source| SessionStoreError::Corrupt {
                path: self.path.clone(),
                source,
            },
        )?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, body).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))
    }

    fn clear_flag(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(self.io_error(err)),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    logged_in: AtomicBool,
}

impl MemorySessionStore {
    pub fn logged_in() -> Self {
        Self {
            logged_in: AtomicBool::new(true),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn read_flag(&self) -> Result<bool, SessionStoreError> {
        Ok(self.logged_in.load(Ordering::SeqCst))
    }

    fn write_flag(&self) -> Result<(), SessionStoreError> {
        self.logged_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear_flag(&self) -> Result<(), SessionStoreError> {
        self.logged_in.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Session handle created once at startup and passed to everything that reads or changes
/// the flag.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
}

impl SessionContext {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::default()))
    }

    /// Unreadable storage counts as logged out.
    pub fn is_authenticated(&self) -> bool {
        match self.store.read_flag() {
            Ok(flag) => flag,
            Err(err) => {
                warn!(error = %err, "session flag unreadable; treating as logged out");
                false
            }
        }
    }

    /// Only the login flow calls this, after the auth service accepted the credentials.
    pub(crate) fn mark_authenticated(&self) -> Result<(), SessionStoreError> {
        self.store.write_flag()?;
        info!("session flag set");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), SessionStoreError> {
        self.store.clear_flag()?;
        info!("session flag cleared");
        Ok(())
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
