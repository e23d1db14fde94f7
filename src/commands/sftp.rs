//! Leaves under `Sftp/`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::{IgnoreList, SftpProfile};
use crate::context::AppContext;
use crate::error::{AppError, Result};
use crate::filesystem::{
    group_by_directory, is_pseudo_entry, join_remote, read_text_if_file, remove_path,
    walk_local_files, walk_remote_dirs, walk_remote_files,
};
use crate::menu::MenuAction;
use crate::transfer::{SyncPlanner, UploadOutcome, UploadScheduler};
use crate::ui::Ui;
use crate::utils::expand_tilde;

/// Login directory of the SFTP user.
const REMOTE_HOME: &str = ".";

/// Configured value, or a prompt when there is none.
fn configured_or_prompt(
    ui: &dyn Ui,
    configured: Option<&str>,
    message: &str,
    default: Option<&str>,
) -> Result<String> {
    if let Some(value) = configured.map(str::trim).filter(|value| !value.is_empty()) {
        return Ok(value.to_string());
    }
    let answer = ui.prompt(message, default)?;
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(AppError::ValidationError(format!("{message} needs a value")));
    }
    Ok(answer.to_string())
}

fn local_dir(path: &str) -> Result<PathBuf> {
    let path = expand_tilde(path);
    if !path.is_dir() {
        return Err(AppError::ValidationError(format!(
            "'{}' is not a local directory",
            path.display()
        )));
    }
    Ok(path)
}

fn report_outcome(ui: &dyn Ui, outcome: &UploadOutcome) {
    ui.info(&format!(
        "Uploaded {}, ignored {}, failed {}",
        outcome.success, outcome.ignored, outcome.failed
    ));
}

/// Make sure the endpoint and the ignore list are configured.
pub struct EnsureSftpProfiles;

#[async_trait]
impl MenuAction for EnsureSftpProfiles {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        ctx.ui().info("Checking SFTP profiles...");
        ctx.store().get::<SftpProfile>(ctx.ui())?;
        ctx.store().get::<IgnoreList>(ctx.ui())?;
        Ok(())
    }
}

/// Upload every local file that is missing remotely or differs in size.
pub struct SyncCommand;

#[async_trait]
impl MenuAction for SyncCommand {
    async fn execute(&self, ctx: &AppContext, token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let settings = ctx.settings();
        let ignore: IgnoreList = ctx.store().get(ui)?;

        let local_root = local_dir(&configured_or_prompt(
            ui,
            settings.sync_local_dir.as_deref(),
            "Local directory:",
            None,
        )?)?;
        let remote_root = configured_or_prompt(
            ui,
            settings.sync_remote_dir.as_deref(),
            "Remote directory:",
            None,
        )?;

        let pool = ctx.pool().await?;
        let diff = {
            let session = pool.acquire().await?;
            SyncPlanner::new(&ignore)
                .diff(&local_root, &*session, &remote_root)
                .await?
        };

        ui.info(&format!(
            "Total {}, pending {}, up to date {}, ignored {}",
            diff.total_local,
            diff.pending.len(),
            diff.total_local - diff.pending.len(),
            diff.ignored
        ));
        if diff.pending.is_empty() {
            ui.info("Local and remote are already in sync");
            return Ok(());
        }
        if token.is_cancelled() {
            return Err(AppError::UserCancelled);
        }

        let paths: Vec<String> = diff.pending.into_iter().collect();
        let outcome = UploadScheduler::new(pool, ui, &ignore, settings.upload_permissions)
            .run_batch_with_retry(&local_root, &paths, &remote_root, settings.upload_retries)
            .await;
        report_outcome(ui, &outcome);
        Ok(())
    }
}

/// Show the entries of one remote directory.
pub struct ListCommand;

#[async_trait]
impl MenuAction for ListCommand {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let pool = ctx.pool().await?;
        let session = pool.acquire().await?;

        let path = if ui.confirm("Type the path manually?")? {
            ui.prompt("Remote directory:", Some(REMOTE_HOME))?
        } else {
            let dirs: Vec<String> = walk_remote_dirs(&*session, REMOTE_HOME)
                .await?
                .into_iter()
                .map(|dir| join_remote(REMOTE_HOME, &dir.relative))
                .collect();
            let choices: Vec<String> = std::iter::once(REMOTE_HOME.to_string()).chain(dirs).collect();
            match ui.select("Remote directory", &choices)? {
                Some(index) if index < choices.len() => choices[index].clone(),
                _ => return Err(AppError::ValidationError("no directory selected".to_string())),
            }
        };

        let entries: Vec<_> = session
            .list_dir(&path)
            .await?
            .into_iter()
            .filter(|entry| !is_pseudo_entry(&entry.name))
            .collect();
        let groups = group_by_directory(entries.iter().map(|entry| (entry.path.as_str(), entry.is_dir)));
        ui.tree(&path, &groups);
        Ok(())
    }
}

/// Show every remote file below a directory.
pub struct ListRecursiveCommand;

#[async_trait]
impl MenuAction for ListRecursiveCommand {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let root = ui.prompt("Remote directory:", Some(REMOTE_HOME))?;
        let pool = ctx.pool().await?;
        let session = pool.acquire().await?;

        let paths: Vec<String> = walk_remote_files(&*session, &root)
            .await?
            .into_iter()
            .map(|file| join_remote(&root, &file.relative))
            .collect();
        let groups = group_by_directory(paths.iter().map(|path| (path.as_str(), false)));
        ui.tree(&root, &groups);
        Ok(())
    }
}

/// Print a remote text file.
pub struct CatCommand;

#[async_trait]
impl MenuAction for CatCommand {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let path = ui.prompt("Remote file:", None)?;
        let pool = ctx.pool().await?;
        let session = pool.acquire().await?;

        let text = read_text_if_file(&*session, path.trim()).await?;
        if text.is_empty() {
            ui.info(&format!("Nothing to show for {}", path.trim()));
        } else {
            ui.show_text(path.trim(), &text);
        }
        Ok(())
    }
}

/// Upload one file into a remote directory, or a whole local directory.
pub struct UploadCommand;

#[async_trait]
impl MenuAction for UploadCommand {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let settings = ctx.settings();
        let local = expand_tilde(ui.prompt("Local file or directory:", None)?.trim());
        let (local_root, paths) = upload_set(&local).await?;
        let remote_dir = configured_or_prompt(ui, None, "Remote directory:", None)?;

        let ignore: IgnoreList = ctx.store().get(ui)?;
        let pool = ctx.pool().await?;
        let outcome = UploadScheduler::new(pool, ui, &ignore, settings.upload_permissions)
            .run_batch(&local_root, &paths, &remote_dir)
            .await;
        report_outcome(ui, &outcome);
        Ok(())
    }
}

/// Root and relative paths to upload for a local file or directory.
async fn upload_set(local: &Path) -> Result<(PathBuf, Vec<String>)> {
    if local.is_file() {
        let name = local
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::ValidationError(format!("'{}' has no file name", local.display())))?;
        let root = local.parent().map(Path::to_path_buf).unwrap_or_default();
        return Ok((root, vec![name]));
    }
    if local.is_dir() {
        let files = walk_local_files(local).await?;
        return Ok((local.to_path_buf(), files.into_iter().map(|file| file.relative).collect()));
    }
    Err(AppError::ValidationError(format!(
        "'{}' does not exist",
        local.display()
    )))
}

/// Delete a remote file or directory tree.
pub struct RemoveCommand;

#[async_trait]
impl MenuAction for RemoveCommand {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let path = ui.prompt("Remote path to delete:", None)?;
        let path = path.trim();
        let pool = ctx.pool().await?;
        let session = pool.acquire().await?;

        remove_path(&*session, path).await?;
        info!("Deleted remote {}", path);
        ui.info(&format!("Deleted {path}"));
        Ok(())
    }
}
