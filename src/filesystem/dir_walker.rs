//! Recursive directory traversal for local and remote roots.
//!
//! Both walkers key entries by their path relative to the root, with `/` as
//! the separator on every platform, so local and remote listings can be
//! compared directly.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::remote::{RemoteFs, is_pseudo_entry, join_remote};
use crate::error::{AppError, Result};

/// A file or directory below a walked root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the root, `/`-separated
    pub relative: String,
    pub len: u64,
    pub is_dir: bool,
}

impl FileEntry {
    /// Last segment of the relative path.
    pub fn file_name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }
}

fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Every regular file below a local directory, using BFS.
pub async fn walk_local_files(root: &Path) -> Result<Vec<FileEntry>> {
    let mut files = Vec::new();
    let mut queue: VecDeque<(PathBuf, String)> = VecDeque::from([(root.to_path_buf(), String::new())]);

    while let Some((dir, prefix)) = queue.pop_front() {
        let mut read_dir = tokio::fs::read_dir(&dir).await.map_err(|e| {
            AppError::IOError(std::io::Error::new(
                e.kind(),
                format!("Failed to read local directory '{}': {e}", dir.display()),
            ))
        })?;

        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            let relative = join_relative(&prefix, &name);

            // Follow symlinks to determine actual type
            let metadata = tokio::fs::metadata(&path).await?;
            if metadata.is_dir() {
                queue.push_back((path, relative));
            } else if metadata.is_file() {
                files.push(FileEntry {
                    relative,
                    len: metadata.len(),
                    is_dir: false,
                });
            }
        }
    }

    debug!("Local walk of {} found {} files", root.display(), files.len());
    Ok(files)
}

/// Every file below a remote directory. A missing root yields no entries.
pub async fn walk_remote_files<R: RemoteFs + ?Sized>(remote: &R, root: &str) -> Result<Vec<FileEntry>> {
    Ok(walk_remote(remote, root)
        .await?
        .into_iter()
        .filter(|entry| !entry.is_dir)
        .collect())
}

/// Every directory below a remote directory, children before parents.
pub async fn walk_remote_dirs<R: RemoteFs + ?Sized>(remote: &R, root: &str) -> Result<Vec<FileEntry>> {
    let mut dirs: Vec<FileEntry> = walk_remote(remote, root)
        .await?
        .into_iter()
        .filter(|entry| entry.is_dir)
        .collect();
    dirs.reverse();
    Ok(dirs)
}

async fn walk_remote<R: RemoteFs + ?Sized>(remote: &R, root: &str) -> Result<Vec<FileEntry>> {
    let root = if root.len() > 1 {
        root.trim_end_matches('/')
    } else {
        root
    };
    if !remote.exists(root).await? {
        debug!("Remote root {} does not exist", root);
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let mut queue: VecDeque<(String, String)> = VecDeque::from([(root.to_string(), String::new())]);

    while let Some((dir, prefix)) = queue.pop_front() {
        for entry in remote.list_dir(&dir).await? {
            if is_pseudo_entry(&entry.name) {
                continue;
            }
            let relative = join_relative(&prefix, &entry.name);
            if entry.is_dir {
                queue.push_back((join_remote(&dir, &entry.name), relative.clone()));
            }
            entries.push(FileEntry {
                relative,
                len: entry.len,
                is_dir: entry.is_dir,
            });
        }
    }

    Ok(entries)
}
