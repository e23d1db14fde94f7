//! Bounded-concurrency batch uploads over pooled sessions.

use std::path::Path;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use tracing::{debug, info, warn};

use super::pool::SessionPool;
use super::TransferSpec;
use crate::config::IgnoreList;
use crate::error::{AppError, Result};
use crate::filesystem::ensure_remote_dirs;
use crate::ui::Ui;

/// Counters of one batch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOutcome {
    pub success: usize,
    pub ignored: usize,
    pub failed: usize,
}

pub struct UploadScheduler<'a> {
    pool: &'a SessionPool,
    ui: &'a dyn Ui,
    ignore: &'a IgnoreList,
    permissions: u32,
    limit: usize,
}

impl<'a> UploadScheduler<'a> {
    /// Concurrency defaults to the pool's prewarm size.
    pub fn new(pool: &'a SessionPool, ui: &'a dyn Ui, ignore: &'a IgnoreList, permissions: u32) -> Self {
        Self {
            pool,
            ui,
            ignore,
            permissions,
            limit: pool.prewarm_size().max(1),
        }
    }

    pub fn with_limit(self, limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            ..self
        }
    }

    /// Upload every path (relative to `local_root`) below `remote_root`.
    ///
    /// Failures are reported and counted; they never abort sibling transfers.
    pub async fn run_batch(&self, local_root: &Path, paths: &[String], remote_root: &str) -> UploadOutcome {
        let mut outcome = UploadOutcome::default();

        let specs: Vec<TransferSpec> = paths
            .iter()
            .map(|path| TransferSpec::new(local_root, path, remote_root))
            .filter(|spec| {
                let ignored = self.ignore.is_ignored(spec.file_name());
                if ignored {
                    debug!("Skipping ignored file {}", spec.relative);
                    outcome.ignored += 1;
                }
                !ignored
            })
            .collect();

        let mut in_flight = FuturesUnordered::new();

        for spec in &specs {
            // Wait for a slot
            while in_flight.len() >= self.limit {
                if let Some((done, result)) = in_flight.next().await {
                    self.finish(&mut outcome, done, result);
                }
            }

            in_flight.push(async move { (spec, self.transfer(spec).await) });
        }

        while let Some((done, result)) = in_flight.next().await {
            self.finish(&mut outcome, done, result);
        }

        info!(
            "Upload pass to {}: {} ok, {} ignored, {} failed",
            remote_root, outcome.success, outcome.ignored, outcome.failed
        );
        outcome
    }

    /// Run [`Self::run_batch`] and re-submit the identical path set while a
    /// pass reports failures, at most `max_retries` more times.
    pub async fn run_batch_with_retry(
        &self,
        local_root: &Path,
        paths: &[String],
        remote_root: &str,
        max_retries: usize,
    ) -> UploadOutcome {
        let mut outcome = self.run_batch(local_root, paths, remote_root).await;
        let mut attempt = 0;

        while outcome.failed > 0 && attempt < max_retries {
            attempt += 1;
            warn!(
                "{} uploads failed, retrying batch ({}/{})",
                outcome.failed, attempt, max_retries
            );
            self.ui.info(&format!(
                "{} uploads failed, retrying ({attempt}/{max_retries})",
                outcome.failed
            ));
            outcome = self.run_batch(local_root, paths, remote_root).await;
        }

        outcome
    }

    fn finish(&self, outcome: &mut UploadOutcome, spec: &TransferSpec, result: Result<u64>) {
        match result {
            Ok(_) => outcome.success += 1,
            Err(e) => {
                outcome.failed += 1;
                warn!("Upload of {} failed: {}", spec.relative, e);
                self.ui.report_error(&AppError::TransferFailed {
                    path: spec.relative.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    async fn transfer(&self, spec: &TransferSpec) -> Result<u64> {
        let mut file = tokio::fs::File::open(&spec.local_path).await?;
        let total = file.metadata().await?.len();

        let session = self.pool.acquire().await?;
        ensure_remote_dirs(&*session, &spec.remote_path).await?;

        let label = spec.relative.as_str();
        let ui = self.ui;
        let written = session
            .upload(&mut file, &spec.remote_path, &|written: u64| ui.progress(written, total, label))
            .await?;
        session.set_permissions(&spec.remote_path, self.permissions).await?;

        debug!("Uploaded {} ({} bytes)", spec.remote_path, written);
        Ok(written)
    }
}
