//! Push center: background long-poll of `/events` with handler dispatch.
//!
//! Drives [`Storer::next_event`] in a loop, resuming from the uuid of the
//! last notification, and hands every event to the handler registered for
//! its entity type (plus an optional catch-all). Poll failures back off
//! exponentially with jitter and retry.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bambou::{PushCenter, Session};
//!
//! let mut push = PushCenter::new(Arc::clone(&session));
//! push.register_handler("enterprise", |event| {
//!     println!("{} {}", event.event_type, event.entity_type);
//! });
//! push.start();
//! // ...
//! push.stop().await;
//! ```

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::notification::{Event, Notification};
use crate::storer::Storer;

// ── Channel capacity ─────────────────────────────────────────────────

const NOTIFICATION_CHANNEL_CAPACITY: usize = 16;

/// Callback invoked for each received event.
pub type EventHandler = Arc<dyn Fn(&Event) + Send + Sync>;

// ── BackoffConfig ────────────────────────────────────────────────────

/// Exponential backoff configuration for failed polls.
#[derive(Debug, Clone)]
pub struct BackoffConfig {
    /// Delay after the first failure. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Consecutive failures tolerated before the push center gives up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Handlers {
    by_entity: HashMap<String, EventHandler>,
    fallback: Option<EventHandler>,
}

impl Handlers {
    fn dispatch(&self, notification: &Notification) {
        for event in &notification.events {
            if let Some(ref handler) = self.fallback {
                handler(event);
            }
            if let Some(handler) = self.by_entity.get(&event.entity_type) {
                handler(event);
            }
        }
    }
}

// ── PushCenter ───────────────────────────────────────────────────────

/// Background listener for VSD push notifications.
///
/// Handlers can be (un)registered while the listener runs.
pub struct PushCenter<S: Storer + 'static> {
    session: Arc<S>,
    handlers: Arc<RwLock<Handlers>>,
    backoff: BackoffConfig,
    cancel: Option<CancellationToken>,
    task: Option<JoinHandle<()>>,
}

impl<S: Storer + 'static> PushCenter<S> {
    pub fn new(session: Arc<S>) -> Self {
        Self {
            session,
            handlers: Arc::new(RwLock::new(Handlers::default())),
            backoff: BackoffConfig::default(),
            cancel: None,
            task: None,
        }
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    /// Call `handler` for every event whose `entityType` is `entity_type`.
    /// Replaces any handler already registered for that type.
    pub fn register_handler<F>(&self, entity_type: impl Into<String>, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers_mut()
            .by_entity
            .insert(entity_type.into(), Arc::new(handler));
    }

    pub fn unregister_handler(&self, entity_type: &str) {
        self.handlers_mut().by_entity.remove(entity_type);
    }

    /// Call `handler` for every event, before any type-specific handler.
    pub fn register_default_handler<F>(&self, handler: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.handlers_mut().fallback = Some(Arc::new(handler));
    }

    pub fn unregister_default_handler(&self) {
        self.handlers_mut().fallback = None;
    }

    /// Spawn the listener. Returns `false` if it is already running.
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            return false;
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(listen(
            Arc::clone(&self.session),
            Arc::clone(&self.handlers),
            self.backoff.clone(),
            cancel.clone(),
        ));

        self.cancel = Some(cancel);
        self.task = Some(task);
        tracing::info!("push center started");
        true
    }

    /// Cancel the listener and wait for it to exit.
    pub async fn stop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "push center task ended abnormally");
            }
        }
        tracing::info!("push center stopped");
    }

    /// `true` while the listener task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn handlers_mut(&self) -> std::sync::RwLockWriteGuard<'_, Handlers> {
        self.handlers.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: Storer + 'static> Drop for PushCenter<S> {
    fn drop(&mut self) {
        if let Some(ref cancel) = self.cancel {
            cancel.cancel();
        }
    }
}

// ── Background loop ──────────────────────────────────────────────────

/// Main loop: poll → dispatch → on error, backoff → poll again.
async fn listen<S: Storer>(
    session: Arc<S>,
    handlers: Arc<RwLock<Handlers>>,
    backoff: BackoffConfig,
    cancel: CancellationToken,
) {
    let (tx, mut rx) = mpsc::channel::<Notification>(NOTIFICATION_CHANNEL_CAPACITY);
    let mut last_event_id: Option<String> = None;
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = session.next_event(&tx, last_event_id.as_deref()) => {
                match result {
                    Ok(()) => attempt = 0,
                    Err(e) => {
                        tracing::warn!(error = %e, attempt, "event poll failed");

                        if let Some(max) = backoff.max_retries {
                            if attempt >= max {
                                tracing::error!(max_retries = max, "event poll retry limit reached, giving up");
                                break;
                            }
                        }

                        let delay = calculate_backoff(attempt, &backoff);
                        tracing::info!(
                            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                            attempt,
                            "waiting before next poll"
                        );

                        tokio::select! {
                            biased;
                            () = cancel.cancelled() => break,
                            () = tokio::time::sleep(delay) => {}
                        }

                        attempt = attempt.saturating_add(1);
                    }
                }
            }
        }

        while let Ok(notification) = rx.try_recv() {
            last_event_id = Some(notification.uuid.clone());
            handlers
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .dispatch(&notification);
        }
    }

    tracing::debug!("push center loop exiting");
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) * (1 +- 0.25)`
fn calculate_backoff(attempt: u32, config: &BackoffConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(30)).unwrap_or(30);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    // Deterministic jitter seeded from the attempt number.
    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::Map;

    use super::*;

    fn event(entity_type: &str) -> Event {
        Event {
            entity_type: entity_type.into(),
            event_type: "UPDATE".into(),
            update_mechanism: "DEFAULT".into(),
            entities: Vec::new(),
            extra: Map::new(),
        }
    }

    #[test]
    fn default_backoff_config() {
        let config = BackoffConfig::default();
        assert_eq!(config.initial_delay, Duration::from_secs(1));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.max_retries.is_none());
    }

    #[test]
    fn backoff_increases_exponentially() {
        let config = BackoffConfig::default();

        let d0 = calculate_backoff(0, &config);
        let d1 = calculate_backoff(1, &config);
        let d2 = calculate_backoff(2, &config);

        assert!(d1 > d0, "d1 ({d1:?}) should be greater than d0 ({d0:?})");
        assert!(d2 > d1, "d2 ({d2:?}) should be greater than d1 ({d1:?})");
    }

    #[test]
    fn backoff_caps_at_max_delay() {
        let config = BackoffConfig {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            max_retries: None,
        };

        let d10 = calculate_backoff(10, &config);
        // With jitter factor up to 1.25, max effective is 12.5s
        assert!(d10 <= Duration::from_secs(13), "got {d10:?}");

        // Large attempt counts must not overflow.
        assert!(calculate_backoff(u32::MAX, &config) <= Duration::from_secs(13));
    }

    #[test]
    fn dispatch_routes_by_entity_type() {
        let enterprises = Arc::new(AtomicUsize::new(0));
        let everything = Arc::new(AtomicUsize::new(0));

        let mut handlers = Handlers::default();
        let counter = Arc::clone(&enterprises);
        handlers.by_entity.insert(
            "enterprise".into(),
            Arc::new(move |_: &Event| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        let counter = Arc::clone(&everything);
        handlers.fallback = Some(Arc::new(move |_: &Event| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let notification = Notification {
            events: vec![event("enterprise"), event("domain"), event("enterprise")],
            uuid: "u-1".into(),
        };
        handlers.dispatch(&notification);

        assert_eq!(enterprises.load(Ordering::SeqCst), 2);
        assert_eq!(everything.load(Ordering::SeqCst), 3);
    }
}
