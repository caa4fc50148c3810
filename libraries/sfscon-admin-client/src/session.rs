//! Session and bearer-token persistence.
//!
//! A [`Session`] owns the single bearer token of the admin user. It is
//! created once and handed to everything that needs auth state; the token is
//! read per request, so a logout does not affect requests already in flight.

use crate::error::{AdminClientError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// File name the token is stored under inside the data directory.
pub const TOKEN_FILE_NAME: &str = "token";

/// Persistent storage for a single token.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Whether the storage facility exists in this environment.
    fn is_available(&self) -> bool {
        true
    }

    async fn load(&self) -> Result<Option<String>>;

    async fn save(&self, token: &str) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// Stores the token in `<data_dir>/token`.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(TOKEN_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStorage for FileTokenStorage {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AdminClientError::Storage(format!(
                "failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, token).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .await?;
        }

        debug!(path = %self.path.display(), "Token saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Keeps the token in memory only. Useful for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryTokenStorage {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        // A poisoned lock still holds a valid Option.
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl TokenStorage for MemoryTokenStorage {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.slot().clone())
    }

    async fn save(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// The environment has no persistent storage at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTokenStorage;

#[async_trait]
impl TokenStorage for NoTokenStorage {
    fn is_available(&self) -> bool {
        false
    }

    async fn load(&self) -> Result<Option<String>> {
        Ok(None)
    }

    async fn save(&self, _token: &str) -> Result<()> {
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        Ok(())
    }
}

/// Auth state shared by the gateway client and the dashboard shell.
pub struct Session {
    storage: Arc<dyn TokenStorage>,
    token: watch::Sender<Option<String>>,
    logged_in: watch::Sender<bool>,
    loading: watch::Sender<bool>,
    checking_auth: watch::Sender<bool>,
}

impl Session {
    /// Create a session, hydrating the token from `storage`.
    ///
    /// Missing storage, a missing token and an unreadable token all resolve
    /// to "not logged in".
    pub async fn hydrate(storage: Arc<dyn TokenStorage>) -> Self {
        let token = if storage.is_available() {
            match storage.load().await {
                Ok(token) => token,
                Err(e) => {
                    warn!(error = %e, "Could not load stored token, starting logged out");
                    None
                }
            }
        } else {
            debug!("No token storage available");
            None
        };

        debug!(logged_in = token.is_some(), "Session hydrated");
        Self::from_parts(storage, token)
    }

    /// A session that never persists anything.
    pub fn in_memory() -> Self {
        Self::from_parts(Arc::new(MemoryTokenStorage::new()), None)
    }

    fn from_parts(storage: Arc<dyn TokenStorage>, token: Option<String>) -> Self {
        let logged_in = token.is_some();
        Self {
            storage,
            token: watch::Sender::new(token),
            logged_in: watch::Sender::new(logged_in),
            loading: watch::Sender::new(false),
            checking_auth: watch::Sender::new(false),
        }
    }

    /// Current token, read at call time.
    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    /// Snapshot of the login state.
    pub fn is_logged_in(&self) -> bool {
        *self.logged_in.borrow()
    }

    /// Observe the login state. The receiver sees the current value first.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.logged_in.subscribe()
    }

    /// Persist a freshly issued token and publish the logged-in state.
    ///
    /// The token is kept for this process even if persisting fails.
    pub async fn store_token(&self, token: String) -> Result<()> {
        let persisted = self.storage.save(&token).await;
        self.publish(Some(token));
        persisted
    }

    /// Forget the token and publish the logged-out state.
    pub async fn clear(&self) -> Result<()> {
        let cleared = self.storage.clear().await;
        self.publish(None);
        info!("Logged out");
        cleared
    }

    fn publish(&self, token: Option<String>) {
        let logged_in = token.is_some();
        self.token.send_replace(token);
        self.logged_in.send_replace(logged_in);
    }

    pub fn set_loading(&self, loading: bool) {
        self.loading.send_replace(loading);
    }

    pub fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn set_checking_auth(&self, checking: bool) {
        self.checking_auth.send_replace(checking);
    }

    pub fn checking_auth(&self) -> watch::Receiver<bool> {
        self.checking_auth.subscribe()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("logged_in", &self.is_logged_in())
            .finish_non_exhaustive()
    }
}
