// Application-owned handle to the active session.
//
// Callers keep one `SessionContext` (usually behind an `Arc`) and pass it to
// whatever needs "the current session". Swapping is lock-free; the last
// `start` wins.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::debug;

use crate::error::Error;
use crate::storer::Storer;

pub struct SessionContext<S> {
    current: ArcSwapOption<S>,
}

impl<S: Storer> SessionContext<S> {
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// Register `session` as current, then authenticate it.
    ///
    /// The session stays registered even if authentication fails, so the
    /// caller can inspect or reset it.
    pub async fn start(&self, session: Arc<S>) -> Result<Arc<S>, Error> {
        self.current.store(Some(Arc::clone(&session)));
        session.start().await?;
        debug!("session registered and started");
        Ok(session)
    }

    /// The most recently started session, if any.
    pub fn current(&self) -> Option<Arc<S>> {
        self.current.load_full()
    }

    /// Reset the current session (dropping its API key) and unregister it.
    pub async fn reset(&self) {
        if let Some(session) = self.current.swap(None) {
            session.reset().await;
            debug!("session reset and unregistered");
        }
    }
}

impl<S: Storer> Default for SessionContext<S> {
    fn default() -> Self {
        Self::new()
    }
}
