//! Remote file endpoint abstraction.

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tracing::debug;

use crate::error::{AppError, Result};

/// Size and kind of a remote path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteMetadata {
    pub len: u64,
    pub is_dir: bool,
}

/// One entry of a remote directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    /// Full remote path of the entry
    pub path: String,
    pub len: u64,
    pub is_dir: bool,
}

/// Capabilities the console needs from a remote file endpoint.
///
/// Remote paths always use `/` as separator.
#[async_trait]
pub trait RemoteFs: Send + Sync {
    async fn connect(&mut self) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;

    fn is_connected(&self) -> bool;

    async fn exists(&self, path: &str) -> Result<bool>;

    async fn stat(&self, path: &str) -> Result<RemoteMetadata>;

    /// May include the `.` and `..` pseudo-entries; callers skip them.
    async fn list_dir(&self, path: &str) -> Result<Vec<RemoteEntry>>;

    async fn read_to_string(&self, path: &str) -> Result<String>;

    /// Stream `source` into `remote_path`, creating or truncating it.
    /// `on_written` receives the cumulative byte count after every chunk.
    async fn upload(
        &self,
        source: &mut (dyn AsyncRead + Unpin + Send),
        remote_path: &str,
        on_written: &(dyn Fn(u64) + Send + Sync),
    ) -> Result<u64>;

    async fn remove_file(&self, path: &str) -> Result<()>;

    async fn remove_dir(&self, path: &str) -> Result<()>;

    async fn create_dir(&self, path: &str) -> Result<()>;

    async fn set_permissions(&self, path: &str, mode: u32) -> Result<()>;
}

pub fn is_pseudo_entry(name: &str) -> bool {
    name == "." || name == ".."
}

/// Join remote path components using `/` regardless of the local OS.
pub fn join_remote(base: &str, component: &str) -> String {
    let component = component.replace('\\', "/");
    let component = component.trim_start_matches('/');
    if base.is_empty() {
        component.to_string()
    } else if base.ends_with('/') {
        format!("{base}{component}")
    } else {
        format!("{base}/{component}")
    }
}

/// Parent of a remote path; `None` for a bare name.
pub fn parent_remote(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(index) => Some(&path[..index]),
        None => None,
    }
}

/// Create every missing directory along `path`, excluding its last segment.
///
/// Each prefix ending right before a `/` is checked and created only when
/// absent, so running it twice is harmless.
pub async fn ensure_remote_dirs<R: RemoteFs + ?Sized>(remote: &R, path: &str) -> Result<()> {
    for (index, byte) in path.bytes().enumerate().skip(1) {
        if byte != b'/' || path.as_bytes()[index - 1] == b'/' {
            continue;
        }
        let prefix = &path[..index];
        if !remote.exists(prefix).await? {
            debug!("Creating remote directory {}", prefix);
            remote.create_dir(prefix).await?;
        }
    }
    Ok(())
}

/// Text of a remote file; empty when the path is missing or a directory.
pub async fn read_text_if_file<R: RemoteFs + ?Sized>(remote: &R, path: &str) -> Result<String> {
    if !remote.exists(path).await? {
        return Ok(String::new());
    }
    if remote.stat(path).await?.is_dir {
        return Ok(String::new());
    }
    remote.read_to_string(path).await
}

/// Delete a file, or a directory together with everything below it.
pub async fn remove_path<R: RemoteFs + ?Sized>(remote: &R, path: &str) -> Result<()> {
    if !remote.exists(path).await? {
        return Err(AppError::RemoteNotFound(path.to_string()));
    }
    if !remote.stat(path).await?.is_dir {
        return remote.remove_file(path).await;
    }

    // Breadth-first: collect directories level by level, delete the deepest first
    let mut dirs = vec![path.to_string()];
    let mut cursor = 0;
    while cursor < dirs.len() {
        let dir = dirs[cursor].clone();
        cursor += 1;
        for entry in remote.list_dir(&dir).await? {
            if is_pseudo_entry(&entry.name) {
                continue;
            }
            if entry.is_dir {
                dirs.push(entry.path);
            } else {
                remote.remove_file(&entry.path).await?;
            }
        }
    }
    for dir in dirs.iter().rev() {
        remote.remove_dir(dir).await?;
    }
    Ok(())
}
