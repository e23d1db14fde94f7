use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use opsmenu::cli::{Cli, Command};
use opsmenu::commands::builtin_registry;
use opsmenu::config::{ProfileStore, SettingsManager, resolve_user};
use opsmenu::menu::{MenuNavigator, run_paths};
use opsmenu::ui::{ConsoleUi, Ui};
use opsmenu::{AppContext, Result, init_panic_hook, init_tracing, restore_terminal};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_panic_hook();

    let ui: Arc<dyn Ui> = Arc::new(ConsoleUi::new());
    if let Err(e) = init_tracing(&cli.log_level) {
        ui.report_error(&e);
    }

    // Failures are reported, never turned into an exit code
    if let Err(e) = run(cli, Arc::clone(&ui)).await
        && !e.is_cancelled()
    {
        error!("Fatal: {}", e);
        ui.report_error(&e);
    }
    info!("opsmenu exiting");
}

async fn run(cli: Cli, ui: Arc<dyn Ui>) -> Result<()> {
    let manager = match &cli.settings {
        Some(path) => SettingsManager::with_path(path)?,
        None => SettingsManager::new()?,
    };
    let mut settings = manager.into_settings();
    if cli.local_dir.is_some() {
        settings.sync_local_dir = cli.local_dir.clone();
    }
    if cli.remote_dir.is_some() {
        settings.sync_remote_dir = cli.remote_dir.clone();
    }

    let store = ProfileStore::new(&settings.profile_dir, "");
    let user_name = resolve_user(&store, ui.as_ref(), cli.user.as_deref())?;
    info!("Logged in as {}", user_name);
    let store = store.with_user(user_name);

    let token = CancellationToken::new();
    spawn_interrupt_handler(token.clone(), Arc::clone(&ui));

    let ctx = AppContext::new(Arc::new(builtin_registry()), ui, store, settings);
    let result = match cli.selected_command() {
        Command::Menu => MenuNavigator::new(&ctx).run(&token).await,
        Command::Batch { paths } => run_paths(&ctx, paths.as_deref(), &token).await.map(|_| ()),
    };

    ctx.shutdown().await;
    result
}

/// First Ctrl-C stops at the next step boundary, the second one quits.
fn spawn_interrupt_handler(token: CancellationToken, ui: Arc<dyn Ui>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            warn!("Unable to listen for Ctrl-C");
            return;
        }
        info!("Interrupt received, cancelling");
        token.cancel();
        ui.info("Stopping after the current step, press Ctrl-C again to quit now");

        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = restore_terminal();
            std::process::exit(0);
        }
    });
}
