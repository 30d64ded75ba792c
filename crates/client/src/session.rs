use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use api_types::auth::User;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{ClientError, Result};

/// Credential and identity of the logged-in user.
///
/// Persisted as `{"token": ..., "user": {...}}`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(Session),
}

/// Durable storage for the session across restarts.
pub trait SessionStorage: fmt::Debug + Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    /// Removes the stored session. Clearing an empty storage is not an error.
    fn clear(&self) -> Result<()>;
}

/// JSON file storage, written atomically (temp file + rename).
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileStorage {
    fn load(&self) -> Result<Option<Session>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ClientError::Storage(err.to_string())),
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(err) => {
                tracing::warn!(
                    "ignoring unreadable session file {}: {err}",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        write_json_file(&self.path, session).map_err(|err| ClientError::Storage(err.to_string()))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::Storage(err.to_string())),
        }
    }
}

/// In-process storage, one per context. Nothing leaks between instances.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    inner: Mutex<Option<Session>>,
}

impl SessionStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Shared handle on the current auth state and its storage.
///
/// Cloning shares the same state; build a new context for an independent
/// session.
#[derive(Clone, Debug)]
pub struct SessionContext {
    state: Arc<RwLock<AuthState>>,
    storage: Arc<dyn SessionStorage>,
}

impl SessionContext {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(AuthState::Anonymous)),
            storage: Arc::new(storage),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::default())
    }

    /// Loads a persisted session, trusting it without asking the service.
    /// An expired token surfaces on the first rejected request.
    pub async fn restore(&self) -> Option<User> {
        let loaded = match self.storage.load() {
            Ok(loaded) => loaded,
            Err(err) => {
                tracing::warn!("failed to load session: {err}");
                None
            }
        };

        let mut state = self.state.write().await;
        match loaded {
            Some(session) => {
                tracing::info!("restored session for {}", session.user.username);
                let user = session.user.clone();
                *state = AuthState::Authenticated(session);
                Some(user)
            }
            None => {
                *state = AuthState::Anonymous;
                None
            }
        }
    }

    /// Enters `Authenticating`, dropping any previous session.
    pub(crate) async fn begin(&self) {
        let mut state = self.state.write().await;
        if let Err(err) = self.storage.clear() {
            tracing::warn!("failed to clear previous session: {err}");
        }
        *state = AuthState::Authenticating;
    }

    /// Persists `session` and enters `Authenticated`.
    pub(crate) async fn establish(&self, session: Session) -> Result<()> {
        let mut state = self.state.write().await;
        if let Err(err) = self.storage.save(&session) {
            *state = AuthState::Anonymous;
            return Err(err);
        }
        *state = AuthState::Authenticated(session);
        Ok(())
    }

    /// Leaves `Authenticating` after a failed attempt.
    pub(crate) async fn abort(&self) {
        let mut state = self.state.write().await;
        if matches!(*state, AuthState::Authenticating) {
            *state = AuthState::Anonymous;
        }
    }

    /// Drops credential and identity, in memory and on storage. Idempotent.
    pub async fn clear(&self) {
        let mut state = self.state.write().await;
        if let Err(err) = self.storage.clear() {
            tracing::warn!("failed to clear stored session: {err}");
        }
        *state = AuthState::Anonymous;
    }

    /// Clears the session only if it still holds `token`, so a rejection of
    /// an old credential cannot log out a newer login.
    pub(crate) async fn invalidate(&self, token: &str) -> bool {
        let mut state = self.state.write().await;
        let current = matches!(&*state, AuthState::Authenticated(session) if session.token == token);
        if current {
            if let Err(err) = self.storage.clear() {
                tracing::warn!("failed to clear stored session: {err}");
            }
            *state = AuthState::Anonymous;
        }
        current
    }

    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        match &*self.state.read().await {
            AuthState::Authenticated(session) => Some(session.token.clone()),
            _ => None,
        }
    }

    pub async fn user(&self) -> Option<User> {
        match &*self.state.read().await {
            AuthState::Authenticated(session) => Some(session.user.clone()),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, AuthState::Authenticated(_))
    }
}

fn write_json_file(path: &Path, session: &Session) -> std::io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(session).map_err(std::io::Error::other)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}
