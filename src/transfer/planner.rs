use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use tracing::{debug, info};

use crate::config::IgnoreList;
use crate::error::Result;
use crate::filesystem::{RemoteFs, walk_local_files, walk_remote_files};

/// Output of one sync scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Relative paths that need an upload
    pub pending: BTreeSet<String>,
    /// Local files considered, ignored ones excluded
    pub total_local: usize,
    pub ignored: usize,
}

/// Compares a local tree against a remote one.
///
/// A local file is up to date when the remote has an entry at the same
/// relative path with the same byte length. Remote-only entries never show up.
pub struct SyncPlanner<'a> {
    ignore: &'a IgnoreList,
}

impl<'a> SyncPlanner<'a> {
    pub fn new(ignore: &'a IgnoreList) -> Self {
        Self { ignore }
    }

    pub async fn diff(
        &self,
        local_root: &Path,
        remote: &dyn RemoteFs,
        remote_root: &str,
    ) -> Result<DiffResult> {
        let local = walk_local_files(local_root).await?;
        let remote_sizes: HashMap<String, u64> = walk_remote_files(remote, remote_root)
            .await?
            .into_iter()
            .map(|entry| (entry.relative, entry.len))
            .collect();

        let mut result = DiffResult::default();
        for entry in local {
            if self.ignore.is_ignored(entry.file_name()) {
                debug!("Ignoring {}", entry.relative);
                result.ignored += 1;
                continue;
            }

            result.total_local += 1;
            if remote_sizes.get(&entry.relative) != Some(&entry.len) {
                result.pending.insert(entry.relative);
            }
        }

        info!(
            "Diff {} -> {}: {} pending of {} local, {} ignored",
            local_root.display(),
            remote_root,
            result.pending.len(),
            result.total_local,
            result.ignored
        );
        Ok(result)
    }
}
