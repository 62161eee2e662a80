/*
 * Persists the whole `AppState` as one JSON blob under a fixed name (`movie_state.json` in
 * the application's config directory). Loading never fails from the caller's point of view:
 * a missing or malformed blob yields the empty default state. Saving is best-effort and only
 * logs when the write does not succeed.
 *
 * The fallible primitives (`read_state`, `write_state`) are what implementors provide; the
 * infallible `load`/`save` pair used by the state store is layered on top of them.
 */
use crate::core::models::AppState;
use crate::core::path_utils;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const STATE_FILENAME: &str = "movie_state.json";

#[derive(Debug)]
pub enum PersistenceError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoStorageLocation,
}

impl From<io::Error> for PersistenceError {
    fn from(err: io::Error) -> Self {
        PersistenceError::Io(err)
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serde(err)
    }
}

impl std::fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PersistenceError::Io(e) => write!(f, "State storage I/O error: {e}"),
            PersistenceError::Serde(e) => write!(f, "State blob could not be (de)serialized: {e}"),
            PersistenceError::NoStorageLocation => {
                write!(f, "No location available for the state file")
            }
        }
    }
}

impl std::error::Error for PersistenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PersistenceError::Io(e) => Some(e),
            PersistenceError::Serde(e) => Some(e),
            PersistenceError::NoStorageLocation => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;

pub trait StatePersistenceOperations: Send + Sync {
    /// Reads the stored blob. `Ok(None)` means nothing has been stored yet.
    fn read_state(&self) -> Result<Option<AppState>>;

    /// Serializes `state` and overwrites any previously stored blob.
    fn write_state(&self, state: &AppState) -> Result<()>;

    /*
     * Returns the stored state, or the empty default when nothing is stored or the stored
     * blob cannot be read. The failure is logged, not surfaced.
     */
    fn load(&self) -> AppState {
        match self.read_state() {
            Ok(Some(state)) => state,
            Ok(None) => {
                log::debug!("StatePersistence: No stored state; starting from defaults.");
                AppState::default()
            }
            Err(e) => {
                log::warn!(
                    "StatePersistence: Stored state unusable ({e}); starting from defaults."
                );
                AppState::default()
            }
        }
    }

    /// Best-effort write of `state`; failures are logged and otherwise ignored.
    fn save(&self, state: &AppState) {
        if let Err(e) = self.write_state(state) {
            log::error!("StatePersistence: Failed to save state: {e}");
        }
    }
}

// File-backed storage of the state blob.
pub struct CoreStatePersistence {
    file_path: Option<PathBuf>,
}

impl CoreStatePersistence {
    /// Stores the blob in the config directory of `app_name`.
    pub fn new(app_name: &str) -> Self {
        let file_path = path_utils::app_file_path(app_name, STATE_FILENAME);
        if file_path.is_none() {
            log::warn!("CoreStatePersistence: No config directory for '{app_name}'.");
        }
        CoreStatePersistence { file_path }
    }

    #[cfg(test)]
    pub fn at_path(file_path: &Path) -> Self {
        CoreStatePersistence {
            file_path: Some(file_path.to_path_buf()),
        }
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }
}

impl StatePersistenceOperations for CoreStatePersistence {
    fn read_state(&self) -> Result<Option<AppState>> {
        let file_path = self
            .file_path
            .as_ref()
            .ok_or(PersistenceError::NoStorageLocation)?;
        if !file_path.exists() {
            return Ok(None);
        }
        let reader = BufReader::new(File::open(file_path)?);
        let state: AppState = serde_json::from_reader(reader)?;
        log::debug!(
            "CoreStatePersistence: Loaded state with {} favorites from {file_path:?}.",
            state.favorites.len()
        );
        Ok(Some(state))
    }

    fn write_state(&self, state: &AppState) -> Result<()> {
        let file_path = self
            .file_path
            .as_ref()
            .ok_or(PersistenceError::NoStorageLocation)?;
        let mut writer = BufWriter::new(File::create(file_path)?);
        serde_json::to_writer(&mut writer, state)?;
        writer.flush()?;
        log::trace!("CoreStatePersistence: Saved state to {file_path:?}.");
        Ok(())
    }
}

/*
 * Keeps the serialized blob in memory. Used when no config directory exists, so the
 * session still works without remembering anything, and by tests.
 */
#[derive(Default)]
pub struct InMemoryStatePersistence {
    blob: Mutex<Option<String>>,
}

impl InMemoryStatePersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with raw text, as if a previous session had written it.
    #[cfg(test)]
    pub fn with_blob(blob: &str) -> Self {
        InMemoryStatePersistence {
            blob: Mutex::new(Some(blob.to_string())),
        }
    }

    #[cfg(test)]
    pub fn blob(&self) -> Option<String> {
        self.blob.lock().ok().and_then(|guard| guard.clone())
    }
}

impl StatePersistenceOperations for InMemoryStatePersistence {
    fn read_state(&self) -> Result<Option<AppState>> {
        let guard = self
            .blob
            .lock()
            .map_err(|_| PersistenceError::NoStorageLocation)?;
        match guard.as_deref() {
            Some(text) => Ok(Some(serde_json::from_str(text)?)),
            None => Ok(None),
        }
    }

    fn write_state(&self, state: &AppState) -> Result<()> {
        let text = serde_json::to_string(state)?;
        let mut guard = self
            .blob
            .lock()
            .map_err(|_| PersistenceError::NoStorageLocation)?;
        *guard = Some(text);
        Ok(())
    }
}
