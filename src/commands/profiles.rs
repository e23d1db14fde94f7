//! Leaves under `Profiles/`.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;
use crate::error::Result;
use crate::menu::MenuAction;

/// Delete stored profile documents.
pub struct RemoveProfiles;

#[async_trait]
impl MenuAction for RemoveProfiles {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let names = ctx.store().list()?;
        if names.is_empty() {
            ui.info("No stored profiles");
            return Ok(());
        }

        for index in ui.multi_select("Profiles to delete", &names)? {
            if let Some(name) = names.get(index) {
                ctx.store().delete(name)?;
                ui.info(&format!("Removed {name}"));
            }
        }
        Ok(())
    }
}

/// Print one stored profile document.
pub struct ShowProfile;

#[async_trait]
impl MenuAction for ShowProfile {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let names = ctx.store().list()?;
        if names.is_empty() {
            ui.info("No stored profiles");
            return Ok(());
        }

        if let Some(name) = ui.select("Profile to show", &names)?.and_then(|i| names.get(i)) {
            let raw = ctx.store().read_raw(name)?;
            ui.show_text(name, &raw);
        }
        Ok(())
    }
}

/// Create the profiles the active user does not have yet.
pub struct TouchProfiles;

#[async_trait]
impl MenuAction for TouchProfiles {
    async fn execute(&self, ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
        let ui = ctx.ui();
        let missing = ctx.store().missing_kinds();
        if missing.is_empty() {
            ui.info(&format!("Every profile of {} already exists", ctx.user_name()));
            return Ok(());
        }

        let names: Vec<String> = missing.iter().map(|kind| kind.name.to_string()).collect();
        for index in ui.multi_select("Profiles to create", &names)? {
            if let Some(kind) = missing.get(index) {
                kind.create(ctx.store(), ui)?;
            }
        }
        Ok(())
    }
}
