use crate::common::constants::USER_STORAGE_KEY;
use crate::common::error::Result;
use crate::common::types::UserInfo;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Client-side session: the logged-in user's info plus a hydration flag.
///
/// Implementations are injected wherever the session is read (the API client
/// reads the bearer token from here) instead of living in a global.
pub trait SessionStore: Send + Sync {
    fn user_info(&self) -> Option<UserInfo>;

    fn set_user_info(&self, info: UserInfo) -> Result<()>;

    /// Forget the user and remove any persisted copy
    fn clear(&self) -> Result<()>;

    /// True once persisted state has been loaded (or found absent)
    fn has_hydrated(&self) -> bool;

    fn token(&self) -> Option<String> {
        self.user_info().and_then(|u| u.token)
    }

    fn user_id(&self) -> Option<i64> {
        self.user_info().and_then(|u| u.user_id)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    user_info: Option<UserInfo>,
    hydrated: bool,
}

/// Shape written to disk, matching the browser's persisted blob
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    state: PersistedState,
    #[serde(default)]
    version: u32,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedState {
    user_info: Option<UserInfo>,
}

/// Session kept only in memory, hydrated from the start
pub struct InMemorySessionStore {
    state: Mutex<SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState { user_info: None, hydrated: true }),
        }
    }

    pub fn with_user(info: UserInfo) -> Self {
        Self {
            state: Mutex::new(SessionState { user_info: Some(info), hydrated: true }),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn user_info(&self) -> Option<UserInfo> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).user_info.clone()
    }

    fn set_user_info(&self, info: UserInfo) -> Result<()> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).user_info = Some(info);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).user_info = None;
        Ok(())
    }

    fn has_hydrated(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).hydrated
    }
}

/// Session persisted as JSON under `<dir>/user-storage-for-virtual.json`
pub struct FileSessionStore {
    path: PathBuf,
    state: Mutex<SessionState>,
}

impl FileSessionStore {
    /// Create the store without touching disk; call [`FileSessionStore::hydrate`] to load.
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}.json", USER_STORAGE_KEY)),
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Create and hydrate in one step
    pub fn open(dir: &Path) -> Result<Self> {
        let store = Self::new(dir);
        store.hydrate()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted blob. A missing file is an empty session; a corrupt one is
    /// discarded with a warning. Either way the store is hydrated afterwards.
    pub fn hydrate(&self) -> Result<()> {
        let user_info = match fs::read_to_string(&self.path) {
            Ok(raw) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) => persisted.state.user_info,
                Err(e) => {
                    warn!("Discarding unreadable session file {}: {}", self.path.display(), e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.user_info = user_info;
        state.hydrated = true;
        info!("Session rehydrated (logged in: {})", state.user_info.is_some());
        Ok(())
    }

    fn persist(&self, user_info: Option<&UserInfo>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let blob = PersistedSession {
            state: PersistedState { user_info: user_info.cloned() },
            version: 0,
        };
        fs::write(&self.path, serde_json::to_vec_pretty(&blob)?)?;
        debug!("Persisted session to {}", self.path.display());
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn user_info(&self) -> Option<UserInfo> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).user_info.clone()
    }

    fn set_user_info(&self, info: UserInfo) -> Result<()> {
        self.persist(Some(&info))?;
        self.state.lock().unwrap_or_else(PoisonError::into_inner).user_info = Some(info);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).user_info = None;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        info!("Session cleared");
        Ok(())
    }

    fn has_hydrated(&self) -> bool {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).hydrated
    }
}
