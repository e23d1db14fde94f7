//! Interactive walk over the menu tree.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::executor::CommandExecutor;
use super::registry::{EntryHook, MenuChoice, PATH_SEPARATOR};
use crate::context::AppContext;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavState {
    AtRoot,
    AtBranch(String),
    AtLeaf(String),
    Exiting,
}

/// State machine over the registry driven by operator selections.
///
/// Entering a path (any state change that lands on it) fires that path's
/// hooks first. Execute-once hooks are dropped after their first firing.
pub struct MenuNavigator<'a> {
    ctx: &'a AppContext,
    stack: Vec<String>,
    hooks: Vec<EntryHook>,
}

impl<'a> MenuNavigator<'a> {
    pub fn new(ctx: &'a AppContext) -> Self {
        Self {
            ctx,
            stack: Vec::new(),
            hooks: ctx.registry().hooks().to_vec(),
        }
    }

    pub fn current_path(&self) -> String {
        self.stack.join(&PATH_SEPARATOR.to_string())
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn resolve(&self) -> NavState {
        if self.stack.is_empty() {
            return NavState::AtRoot;
        }
        let path = self.current_path();
        if self.ctx.registry().is_leaf(&path) {
            NavState::AtLeaf(path)
        } else {
            NavState::AtBranch(path)
        }
    }

    /// Walk the tree until the operator exits, input runs out or `token` fires.
    pub async fn run(&mut self, token: &CancellationToken) -> Result<()> {
        let mut state = self.resolve();
        let mut entered = true;

        while state != NavState::Exiting {
            if token.is_cancelled() {
                info!("Menu cancelled at '{}'", self.current_path());
                break;
            }

            if entered {
                self.fire_hooks(token).await;
            }

            let next = match &state {
                NavState::AtLeaf(path) => {
                    if let Some(command) = self.ctx.registry().command(path) {
                        CommandExecutor::new(self.ctx).run(command, token).await;
                    } else {
                        warn!("No command registered at {}", path);
                    }
                    self.stack.pop();
                    self.resolve()
                }
                NavState::AtRoot | NavState::AtBranch(_) => match self.select() {
                    Ok(next) => next,
                    Err(e) if e.is_cancelled() => {
                        info!("Input closed, leaving menu");
                        NavState::Exiting
                    }
                    Err(e) => return Err(e),
                },
                NavState::Exiting => NavState::Exiting,
            };

            entered = next != state;
            state = next;
        }

        Ok(())
    }

    async fn fire_hooks(&mut self, token: &CancellationToken) {
        let path = self.current_path();
        let ui = self.ctx.ui();
        let mut index = 0;

        while index < self.hooks.len() {
            if self.hooks[index].path != path {
                index += 1;
                continue;
            }

            let hook = self.hooks[index].clone();
            debug!("Entering {}, firing hook", path);
            if let Err(e) = hook.action.execute(self.ctx, token).await
                && !e.is_cancelled()
            {
                warn!("Entry hook for '{}' failed: {}", path, e);
                ui.report_error(&e);
            }

            if hook.execute_once {
                self.hooks.remove(index);
            } else {
                index += 1;
            }
        }
    }

    /// Show the current menu and apply the pick.
    fn select(&mut self) -> Result<NavState> {
        let ui = self.ctx.ui();
        let path = self.current_path();
        let choices = self.ctx.registry().children_of(&path);
        let items: Vec<String> = choices.iter().map(ToString::to_string).collect();

        let title = format!(
            "User: {}  Path: {}",
            self.ctx.user_name(),
            if path.is_empty() { "/" } else { path.as_str() }
        );

        let pick = ui.select(&title, &items)?;
        match pick.and_then(|index| choices.get(index)) {
            Some(MenuChoice::Exit) => {
                if ui.confirm("Exit?")? {
                    Ok(NavState::Exiting)
                } else {
                    Ok(NavState::AtRoot)
                }
            }
            Some(MenuChoice::Back) => {
                self.stack.pop();
                Ok(self.resolve())
            }
            Some(MenuChoice::Child(name)) => {
                self.stack.push(name.clone());
                Ok(self.resolve())
            }
            None => {
                debug!("Selection {:?} out of range, redisplaying", pick);
                Ok(self.resolve())
            }
        }
    }
}
