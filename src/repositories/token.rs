use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use zeroize::Zeroizing;

use crate::error::{AppError, Result};

/// The fixed key the bearer token is persisted under.
pub const TOKEN_KEY: &str = "cm_token";

/// Durable storage for the single bearer token.
///
/// Presence or absence of the token is the only durable session artifact.
pub trait TokenStore: Send + Sync {
    /// Reads the persisted token, if any.
    fn load(&self) -> Result<Option<Zeroizing<String>>>;
    /// Persists `token`, replacing any previous one.
    fn persist(&self, token: &str) -> Result<()>;
    /// Removes the persisted token. Removing an absent token is not an error.
    fn clear(&self) -> Result<()>;
}

/// Keeps the token in a file named [`TOKEN_KEY`] inside a state directory.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(state_dir: impl AsRef<Path>) -> Self {
        Self {
            path: state_dir.as_ref().join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<Zeroizing<String>>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let contents = Zeroizing::new(contents);
                let token = contents.trim();
                if token.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Zeroizing::new(token.to_string())))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    fn persist(&self, token: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path).map_err(|e| {
            AppError::Storage(format!("Failed to open {}: {}", self.path.display(), e))
        })?;
        file.write_all(token.as_bytes())?;
        file.sync_all()?;

        tracing::debug!("🔑 Token persisted to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("🧹 Token removed from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

/// Keeps the token in memory only. Used by embedders without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<Zeroizing<String>>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        Self {
            slot: Mutex::new(Some(Zeroizing::new(token.to_string()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<Zeroizing<String>>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| AppError::Storage("token slot poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn persist(&self, token: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AppError::Storage("token slot poisoned".to_string()))?;
        *slot = Some(Zeroizing::new(token.to_string()));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| AppError::Storage("token slot poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}
