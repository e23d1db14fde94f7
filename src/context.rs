use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::config::{AppSettings, ProfileStore, SftpProfile};
use crate::error::Result;
use crate::filesystem::{RemoteFs, SftpRemote};
use crate::menu::MenuRegistry;
use crate::transfer::{SessionFactory, SessionPool};
use crate::ui::Ui;

/// Everything a menu action can reach, built once at startup.
pub struct AppContext {
    registry: Arc<MenuRegistry>,
    ui: Arc<dyn Ui>,
    store: ProfileStore,
    settings: AppSettings,
    factory: Option<SessionFactory>,
    pool: OnceCell<SessionPool>,
}

impl AppContext {
    pub fn new(
        registry: Arc<MenuRegistry>,
        ui: Arc<dyn Ui>,
        store: ProfileStore,
        settings: AppSettings,
    ) -> Self {
        Self {
            registry,
            ui,
            store,
            settings,
            factory: None,
            pool: OnceCell::new(),
        }
    }

    /// Open remote sessions through `factory` instead of SFTP.
    pub fn with_session_factory(self, factory: SessionFactory) -> Self {
        Self {
            factory: Some(factory),
            ..self
        }
    }

    pub fn registry(&self) -> &MenuRegistry {
        &self.registry
    }

    pub fn ui(&self) -> &dyn Ui {
        self.ui.as_ref()
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn user_name(&self) -> &str {
        self.store.user_name()
    }

    /// The session pool, prewarmed on first use.
    pub async fn pool(&self) -> Result<&SessionPool> {
        self.pool
            .get_or_try_init(|| async {
                let factory = match &self.factory {
                    Some(factory) => Arc::clone(factory),
                    None => {
                        let profile: SftpProfile = self.store.get(self.ui())?;
                        info!("Using SFTP endpoint {}", profile.host_port());
                        Arc::new(move || Box::new(SftpRemote::new(profile.clone())) as Box<dyn RemoteFs>)
                            as SessionFactory
                    }
                };

                let pool = SessionPool::new(factory, self.settings.max_upload_clients);
                pool.prewarm().await?;
                Ok(pool)
            })
            .await
    }

    /// Close pooled sessions, if any were ever opened.
    pub async fn shutdown(&self) {
        if let Some(pool) = self.pool.get() {
            pool.shutdown().await;
        }
    }
}
