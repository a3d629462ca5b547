//! Credential persistence behind an explicit interface.
//! The rest of the crate never touches the storage slot directly, so the
//! backend (browser-local, file, in-memory for tests) can be swapped without
//! touching call sites. One slot, one well-known key.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::identity::Credential;

/// Name of the single storage slot holding the bearer credential.
pub const TOKEN_KEY: &str = "token";

/// Reads never error: an absent or unreadable slot is `None` (fail closed).
/// `clear` is idempotent; clearing an empty slot is a no-op.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Option<Credential>;
    fn store(&self, credential: &Credential) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// In-process slot. Used by tests and by embedders that manage their own
/// persistence. Writers race last-writer-wins, same as the shared-storage
/// slot it stands in for.
#[derive(Default)]
pub struct MemoryStore {
    slot: RwLock<Option<Credential>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_token(raw: &str) -> Self {
        Self { slot: RwLock::new(Some(Credential::new(raw))) }
    }
}

impl CredentialStore for MemoryStore {
    fn load(&self) -> Option<Credential> {
        self.slot.read().clone()
    }

    fn store(&self, credential: &Credential) -> Result<()> {
        *self.slot.write() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.write() = None;
        Ok(())
    }
}

static DEFAULT_ROOT: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var("GATEHOUSE_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".gatehouse"))
});

/// File-backed slot: one file named `token` under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Root from `GATEHOUSE_ROOT`, falling back to `.gatehouse`.
    pub fn default_root() -> Self {
        Self { root: DEFAULT_ROOT.clone() }
    }

    pub fn root(&self) -> &Path { &self.root }

    fn token_path(&self) -> PathBuf { self.root.join(TOKEN_KEY) }
}

impl CredentialStore for FileStore {
    fn load(&self) -> Option<Credential> {
        let raw = fs::read_to_string(self.token_path()).ok()?;
        let raw = raw.trim();
        if raw.is_empty() { return None; }
        Some(Credential::new(raw))
    }

    fn store(&self, credential: &Credential) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating store root {}", self.root.display()))?;
        fs::write(self.token_path(), credential.as_str())
            .with_context(|| format!("writing {}", self.token_path().display()))?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(self.token_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.token_path().display())),
        }
    }
}
