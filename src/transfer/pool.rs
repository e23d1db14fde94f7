//! Reusable authenticated remote sessions.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::filesystem::RemoteFs;

/// Builds a fresh, unconnected session.
pub type SessionFactory = Arc<dyn Fn() -> Box<dyn RemoteFs> + Send + Sync>;

/// Queue of idle sessions shared by every upload task.
///
/// A session is owned by exactly one [`PooledSession`] guard while borrowed
/// and goes back to the queue when the guard drops. The queue has no ceiling:
/// under load it grows past the prewarm size.
pub struct SessionPool {
    idle: Mutex<VecDeque<Box<dyn RemoteFs>>>,
    factory: SessionFactory,
    prewarm_size: usize,
}

impl SessionPool {
    pub fn new(factory: SessionFactory, prewarm_size: usize) -> Self {
        Self {
            idle: Mutex::new(VecDeque::new()),
            factory,
            prewarm_size,
        }
    }

    fn queue(&self) -> MutexGuard<'_, VecDeque<Box<dyn RemoteFs>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of sessions created up front, also the upload concurrency.
    pub fn prewarm_size(&self) -> usize {
        self.prewarm_size
    }

    pub fn idle_count(&self) -> usize {
        self.queue().len()
    }

    /// Create and connect `prewarm_size` sessions concurrently.
    pub async fn prewarm(&self) -> Result<()> {
        let sessions = try_join_all((0..self.prewarm_size).map(|_| async {
            let mut session = (self.factory)();
            session.connect().await?;
            Ok::<_, AppError>(session)
        }))
        .await?;

        self.queue().extend(sessions);
        info!("Prewarmed {} remote sessions", self.prewarm_size);
        Ok(())
    }

    /// Borrow an idle session, creating one when the queue is empty and
    /// reconnecting one that dropped its connection.
    pub async fn acquire(&self) -> Result<PooledSession<'_>> {
        let queued = self.queue().pop_front();
        let mut session = match queued {
            Some(session) => session,
            None => {
                debug!("Session pool empty, opening a new session");
                (self.factory)()
            }
        };

        if !session.is_connected() {
            warn!("Pooled session is disconnected, reconnecting");
            session.connect().await?;
        }

        Ok(PooledSession {
            pool: self,
            session: Some(session),
        })
    }

    fn release(&self, session: Box<dyn RemoteFs>) {
        self.queue().push_back(session);
    }

    /// Disconnect every idle session. Borrowed sessions are left alone.
    pub async fn shutdown(&self) {
        let sessions: Vec<_> = self.queue().drain(..).collect();
        let count = sessions.len();
        for mut session in sessions {
            if let Err(e) = session.disconnect().await {
                warn!("Failed to close remote session: {}", e);
            }
        }
        info!("Closed {} remote sessions", count);
    }
}

/// Exclusive borrow of a pooled session, released on drop.
pub struct PooledSession<'a> {
    pool: &'a SessionPool,
    session: Option<Box<dyn RemoteFs>>,
}

impl Deref for PooledSession<'_> {
    type Target = dyn RemoteFs;

    fn deref(&self) -> &Self::Target {
        match &self.session {
            Some(session) => &**session,
            None => unreachable!("session is only taken on drop"),
        }
    }
}

impl DerefMut for PooledSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match &mut self.session {
            Some(session) => &mut **session,
            None => unreachable!("session is only taken on drop"),
        }
    }
}

impl Drop for PooledSession<'_> {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            self.pool.release(session);
        }
    }
}
