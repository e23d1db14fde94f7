//! In-memory remote endpoint for tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use super::remote::{RemoteEntry, RemoteFs, RemoteMetadata, join_remote, parent_remote};
use crate::error::{AppError, Result};

#[derive(Debug, Default)]
pub(crate) struct MemoryState {
    pub files: BTreeMap<String, Vec<u8>>,
    pub dirs: BTreeSet<String>,
    pub modes: HashMap<String, u32>,
    pub created_dirs: Vec<String>,
    pub uploads: Vec<String>,
    pub connects: usize,
    pub in_flight: usize,
    pub max_in_flight: usize,
    /// Remaining forced failures per destination path
    pub fail_uploads: HashMap<String, usize>,
    /// How long each upload stays in flight
    pub upload_delay: Option<Duration>,
}

/// Sessions cloned from one `MemoryRemote` share the same backing state but
/// keep their own connection flag.
#[derive(Debug, Clone)]
pub(crate) struct MemoryRemote {
    state: Arc<Mutex<MemoryState>>,
    connected: bool,
}

fn normalize(path: &str) -> String {
    if path.len() > 1 {
        path.trim_end_matches('/').to_string()
    } else {
        path.to_string()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            connected: false,
        }
    }

    pub fn connected() -> Self {
        let mut remote = Self::new();
        remote.connected = true;
        remote
    }

    /// A fresh, unconnected session over the same backing state.
    pub fn session(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            connected: false,
        }
    }

    pub fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    pub fn seed_dir(&self, path: &str) {
        self.state().dirs.insert(normalize(path));
    }

    pub fn seed_file(&self, path: &str, content: &[u8]) {
        self.state().files.insert(normalize(path), content.to_vec());
    }

    pub fn fail_upload(&self, path: &str, times: usize) {
        self.state().fail_uploads.insert(normalize(path), times);
    }

    pub fn delay_uploads(&self, delay: Duration) {
        self.state().upload_delay = Some(delay);
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected {
            Ok(())
        } else {
            Err(AppError::ConnectionLost)
        }
    }
}

#[async_trait]
impl RemoteFs for MemoryRemote {
    async fn connect(&mut self) -> Result<()> {
        self.state().connects += 1;
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.connected = false;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        self.ensure_connected()?;
        let path = normalize(path);
        let state = self.state();
        Ok(state.files.contains_key(&path) || state.dirs.contains(&path))
    }

    async fn stat(&self, path: &str) -> Result<RemoteMetadata> {
        self.ensure_connected()?;
        let path = normalize(path);
        let state = self.state();
        if let Some(content) = state.files.get(&path) {
            return Ok(RemoteMetadata {
                len: content.len() as u64,
                is_dir: false,
            });
        }
        if state.dirs.contains(&path) {
            return Ok(RemoteMetadata {
                len: 0,
                is_dir: true,
            });
        }
        Err(AppError::RemoteNotFound(path))
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>> {
        self.ensure_connected()?;
        let dir = normalize(path);
        let state = self.state();
        if !state.dirs.contains(&dir) {
            return Err(AppError::RemoteNotFound(dir));
        }

        let pseudo = |name: &str| RemoteEntry {
            name: name.to_string(),
            path: join_remote(&dir, name),
            len: 0,
            is_dir: true,
        };
        let mut entries = vec![pseudo("."), pseudo("..")];
        for sub in state.dirs.iter().filter(|d| parent_remote(d) == Some(dir.as_str())) {
            let name = sub.rsplit('/').next().unwrap_or_default().to_string();
            entries.push(RemoteEntry {
                name,
                path: sub.clone(),
                len: 0,
                is_dir: true,
            });
        }
        for (file, content) in state
            .files
            .iter()
            .filter(|(f, _)| parent_remote(f) == Some(dir.as_str()))
        {
            let name = file.rsplit('/').next().unwrap_or_default().to_string();
            entries.push(RemoteEntry {
                name,
                path: file.clone(),
                len: content.len() as u64,
                is_dir: false,
            });
        }
        Ok(entries)
    }

    async fn read_to_string(&self, path: &str) -> Result<String> {
        self.ensure_connected()?;
        let path = normalize(path);
        let state = self.state();
        state
            .files
            .get(&path)
            .map(|content| String::from_utf8_lossy(content).into_owned())
            .ok_or(AppError::RemoteNotFound(path))
    }

    async fn upload(
        &self,
        source: &mut (dyn AsyncRead + Unpin + Send),
        remote_path: &str,
        on_written: &(dyn Fn(u64) + Send + Sync),
    ) -> Result<u64> {
        self.ensure_connected()?;
        let path = normalize(remote_path);
        let delay = {
            let mut state = self.state();
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.upload_delay
        };

        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }

        let mut content = Vec::new();
        let read = source.read_to_end(&mut content).await;

        let mut state = self.state();
        state.in_flight -= 1;
        read?;

        if let Some(remaining) = state.fail_uploads.get_mut(&path)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(AppError::TransferFailed {
                path,
                reason: "injected failure".to_string(),
            });
        }
        let parent = parent_remote(&path).unwrap_or("/").to_string();
        if parent != "/" && !state.dirs.contains(&parent) {
            return Err(AppError::RemoteNotFound(parent));
        }

        let len = content.len() as u64;
        state.files.insert(path.clone(), content);
        state.uploads.push(path);
        drop(state);

        on_written(len);
        Ok(len)
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        self.ensure_connected()?;
        let path = normalize(path);
        self.state()
            .files
            .remove(&path)
            .map(|_| ())
            .ok_or(AppError::RemoteNotFound(path))
    }

    async fn remove_dir(&self, path: &str) -> Result<()> {
        self.ensure_connected()?;
        let path = normalize(path);
        if self.state().dirs.remove(&path) {
            Ok(())
        } else {
            Err(AppError::RemoteNotFound(path))
        }
    }

    async fn create_dir(&self, path: &str) -> Result<()> {
        self.ensure_connected()?;
        let path = normalize(path);
        let mut state = self.state();
        state.created_dirs.push(path.clone());
        state.dirs.insert(path);
        Ok(())
    }

    async fn set_permissions(&self, path: &str, mode: u32) -> Result<()> {
        self.ensure_connected()?;
        let path = normalize(path);
        self.state().modes.insert(path, mode);
        Ok(())
    }
}
