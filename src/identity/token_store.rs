use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use parking_lot::RwLock;

/// Fixed file name for the single persisted token. Absence means anonymous.
pub const TOKEN_FILE_NAME: &str = "token";

/// Boundary over client-local token persistence. Exactly one token string
/// lives here at a time; it is read once at startup and cleared on logout.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> Result<()>;
    fn clear(&self);
}

/// File-backed store under a state directory, e.g. `~/.postline/token`.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: AsRef<Path>>(state_dir: P) -> Self {
        Self { path: state_dir.as_ref().join(TOKEN_FILE_NAME) }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = fs::read_to_string(&self.path).ok()?;
        let trimmed = raw.trim();
        if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).context("create token state dir")?;
        }
        fs::write(&self.path, token).context("write token file")?;
        Ok(())
    }

    fn clear(&self) {
        // best-effort; a missing file already means anonymous
        let _ = fs::remove_file(&self.path);
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_token(token: &str) -> Self {
        Self { slot: RwLock::new(Some(token.to_string())) }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> { self.slot.read().clone() }
    fn save(&self, token: &str) -> Result<()> {
        *self.slot.write() = Some(token.to_string());
        Ok(())
    }
    fn clear(&self) { *self.slot.write() = None; }
}
