//! Unattended execution of a list of leaves.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::executor::CommandExecutor;
use crate::context::AppContext;
use crate::error::Result;

/// Leaves named in a comma-separated list that exist and may run unattended.
pub fn eligible_paths(ctx: &AppContext, requested: &str) -> Vec<String> {
    requested
        .split(',')
        .map(str::trim)
        .filter(|path| !path.is_empty())
        .filter(|path| match ctx.registry().command(path) {
            Some(command) if !command.ci_excluded => true,
            Some(_) => {
                debug!("Skipping CI-excluded path {}", path);
                false
            }
            None => {
                debug!("Skipping unknown path {}", path);
                false
            }
        })
        .map(str::to_string)
        .collect()
}

/// Run the requested leaves in order. When none of them is eligible, ask the
/// operator to pick from every leaf that may run unattended.
pub async fn run_paths(
    ctx: &AppContext,
    requested: Option<&str>,
    token: &CancellationToken,
) -> Result<usize> {
    let mut paths = requested
        .map(|requested| eligible_paths(ctx, requested))
        .unwrap_or_default();

    if paths.is_empty() {
        let all = ctx.registry().command_paths(true);
        let picks = ctx.ui().multi_select("Select the menus to run", &all)?;
        paths = picks.into_iter().filter_map(|index| all.get(index).cloned()).collect();
    }

    let executor = CommandExecutor::new(ctx);
    let mut executed = 0;
    for path in &paths {
        if token.is_cancelled() {
            info!("Batch cancelled before {}", path);
            break;
        }
        if let Some(command) = ctx.registry().command(path) {
            executor.run(command, token).await;
            executed += 1;
        }
    }

    info!("Batch ran {} of {} paths", executed, paths.len());
    Ok(executed)
}
