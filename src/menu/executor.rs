use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use super::registry::CommandDescriptor;
use crate::context::AppContext;

/// Runs one leaf and contains whatever it fails with.
pub struct CommandExecutor<'a> {
    ctx: &'a AppContext,
}

impl<'a> CommandExecutor<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self { ctx }
    }

    /// Run the action, repeating while an auto-confirm leaf is told to
    /// continue. Errors are reported and end the run. Returns how many times
    /// the action ran.
    pub async fn run(&self, command: &CommandDescriptor, token: &CancellationToken) -> usize {
        let ui = self.ctx.ui();
        let mut runs = 0;

        ui.info(&format!("{} started", command.path));
        info!("Running {}", command.path);

        while !token.is_cancelled() {
            runs += 1;
            match command.action.execute(self.ctx, token).await {
                Ok(()) if command.auto_confirm => match ui.confirm("Continue?") {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(e) => {
                        if !e.is_cancelled() {
                            ui.report_error(&e);
                        }
                        break;
                    }
                },
                Ok(()) => break,
                Err(e) if e.is_cancelled() => {
                    info!("{} cancelled", command.path);
                    break;
                }
                Err(e) => {
                    error!("{} failed: {}", command.path, e);
                    ui.report_error(&e);
                    break;
                }
            }
        }

        ui.info(&format!("{} finished", command.path));
        runs
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::AppError;
    use crate::menu::MenuRegistry;
    use crate::menu::testing::{Recorder, context};
    use crate::ui::scripted::{Answer, ScriptedUi};

    #[tokio::test]
    async fn test_plain_leaf_runs_once() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::new();
        let command = CommandDescriptor::new("A/x", recorder.clone());
        let ui = Arc::new(ScriptedUi::default());
        let ctx = context(MenuRegistry::default(), ui.clone(), tmp.path());

        let runs = CommandExecutor::new(&ctx).run(&command, &CancellationToken::new()).await;
        assert_eq!(runs, 1);
        assert_eq!(recorder.calls(), 1);
        assert_eq!(ui.infos(), vec!["A/x started", "A/x finished"]);
    }

    #[tokio::test]
    async fn test_auto_confirm_repeats_until_declined() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::new();
        let command = CommandDescriptor::new("A/x", recorder.clone()).auto_confirm();
        let ui = Arc::new(ScriptedUi::new([
            Answer::Confirm(true),
            Answer::Confirm(true),
            Answer::Confirm(false),
        ]));
        let ctx = context(MenuRegistry::default(), ui.clone(), tmp.path());

        let runs = CommandExecutor::new(&ctx).run(&command, &CancellationToken::new()).await;
        assert_eq!(runs, 3);
        assert_eq!(ui.remaining(), 0);
    }

    #[tokio::test]
    async fn test_error_is_reported_and_ends_run() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::failing(AppError::ValidationError("bad input".to_string()));
        let command = CommandDescriptor::new("A/x", recorder.clone()).auto_confirm();
        let ui = Arc::new(ScriptedUi::default());
        let ctx = context(MenuRegistry::default(), ui.clone(), tmp.path());

        let runs = CommandExecutor::new(&ctx).run(&command, &CancellationToken::new()).await;
        assert_eq!(runs, 1);
        assert_eq!(ui.errors(), vec!["Validation error: bad input"]);
    }

    #[tokio::test]
    async fn test_cancelled_action_is_not_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let recorder = Recorder::failing(AppError::UserCancelled);
        let command = CommandDescriptor::new("A/x", recorder.clone());
        let ui = Arc::new(ScriptedUi::default());
        let ctx = context(MenuRegistry::default(), ui.clone(), tmp.path());

        CommandExecutor::new(&ctx).run(&command, &CancellationToken::new()).await;
        assert!(ui.errors().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_auto_confirm_loop() {
        let tmp = tempfile::tempdir().unwrap();
        let token = CancellationToken::new();
        let recorder = Recorder::cancelling(token.clone());
        let command = CommandDescriptor::new("A/x", recorder.clone()).auto_confirm();
        let ui = Arc::new(ScriptedUi::new([Answer::Confirm(true)]));
        let ctx = context(MenuRegistry::default(), ui.clone(), tmp.path());

        let runs = CommandExecutor::new(&ctx).run(&command, &token).await;
        assert_eq!(runs, 1);
        assert_eq!(recorder.calls(), 1);
    }
}
