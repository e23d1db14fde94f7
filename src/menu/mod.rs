//! Menu execution engine.
//!
//! Actions register under slash-delimited paths ("Sftp/sync"). The registry
//! turns those paths into a trie, the navigator walks it interactively and the
//! executor runs whatever leaf the operator lands on.

pub mod batch;
pub mod executor;
pub mod navigator;
pub mod registry;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

pub use batch::run_paths;
pub use executor::CommandExecutor;
pub use navigator::{MenuNavigator, NavState};
pub use registry::{CommandDescriptor, EntryHook, MenuChoice, MenuRegistry, MenuRegistryBuilder};

use crate::context::AppContext;
use crate::error::Result;

/// Work bound to a leaf path or an entry hook.
#[async_trait]
pub trait MenuAction: Send + Sync {
    async fn execute(&self, ctx: &AppContext, token: &CancellationToken) -> Result<()>;
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::{AppSettings, ProfileStore};
    use crate::error::AppError;
    use crate::ui::scripted::ScriptedUi;

    /// Counts invocations and replays queued results, `Ok` once exhausted.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub calls: AtomicUsize,
        results: Mutex<Vec<Result<()>>>,
        cancel_on_call: Option<CancellationToken>,
    }

    impl Recorder {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn failing(error: AppError) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(vec![Err(error)]),
                ..Self::default()
            })
        }

        pub fn cancelling(token: CancellationToken) -> Arc<Self> {
            Arc::new(Self {
                cancel_on_call: Some(token),
                ..Self::default()
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MenuAction for Recorder {
        async fn execute(&self, _ctx: &AppContext, _token: &CancellationToken) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_on_call {
                token.cancel();
            }
            let mut results = self.results.lock().unwrap();
            if results.is_empty() {
                Ok(())
            } else {
                results.remove(0)
            }
        }
    }

    pub(crate) fn context(registry: MenuRegistry, ui: Arc<ScriptedUi>, profiles: &Path) -> AppContext {
        AppContext::new(
            Arc::new(registry),
            ui,
            ProfileStore::new(profiles, "tester"),
            AppSettings::default(),
        )
    }
}
