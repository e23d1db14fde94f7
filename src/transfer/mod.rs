//! Remote synchronization: session pooling, diffing and batch uploads.

pub mod planner;
pub mod pool;
pub mod scheduler;

use std::path::{Path, PathBuf};

pub use planner::{DiffResult, SyncPlanner};
pub use pool::{PooledSession, SessionFactory, SessionPool};
pub use scheduler::{UploadOutcome, UploadScheduler};

use crate::filesystem::join_remote;

/// Specification for a single file transfer within a batch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferSpec {
    /// `/`-separated path relative to the local root, also used as label
    pub relative: String,
    pub local_path: PathBuf,
    pub remote_path: String,
}

impl TransferSpec {
    /// The destination is `remote_root` joined with the whole relative path,
    /// not only the file name, so nested files keep their directories and land
    /// on the same keys the diff compared. A top-level file still ends up at
    /// `remote_root/<file name>`.
    pub fn new(local_root: &Path, relative: &str, remote_root: &str) -> Self {
        let relative = relative.replace('\\', "/");
        let local_path = relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(local_root.to_path_buf(), |path, segment| path.join(segment));
        let remote_path = join_remote(remote_root, &relative);
        Self {
            relative,
            local_path,
            remote_path,
        }
    }

    pub fn file_name(&self) -> &str {
        self.relative.rsplit('/').next().unwrap_or(&self.relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_spec_keeps_relative_structure() {
        let spec = TransferSpec::new(Path::new("/data"), "assets\\img/logo.png", "/srv/www");
        assert_eq!(spec.relative, "assets/img/logo.png");
        assert_eq!(spec.local_path, Path::new("/data").join("assets").join("img").join("logo.png"));
        assert_eq!(spec.remote_path, "/srv/www/assets/img/logo.png");
        assert_eq!(spec.file_name(), "logo.png");
    }

    #[test]
    fn test_top_level_file_lands_under_root() {
        let spec = TransferSpec::new(Path::new("/data"), "b", "/srv");
        assert_eq!(spec.remote_path, "/srv/b");
    }
}
