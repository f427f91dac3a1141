//! Navigation Listeners
//!
//! Ordered observer list with per-listener failure isolation. A listener
//! that returns an error or panics is reported and skipped; the remaining
//! listeners still run.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use uuid::Uuid;

use super::state::NavigationEvent;

/// Unique identifier for a subscription
pub type SubscriptionId = Uuid;

/// Callback invoked after each non-silent navigation
pub type Listener = Arc<dyn Fn(&NavigationEvent) -> anyhow::Result<()> + Send + Sync>;

/// Why a listener did not complete
#[derive(Debug)]
pub enum ListenerFailure {
    /// Listener returned an error
    Error(anyhow::Error),
    /// Listener panicked; holds the panic message when it had one
    Panic(String),
}

impl fmt::Display for ListenerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListenerFailure::Error(e) => write!(f, "listener error: {:#}", e),
            ListenerFailure::Panic(msg) => write!(f, "listener panicked: {}", msg),
        }
    }
}

/// Receives listener failures
pub trait ErrorReporter: Send + Sync {
    fn report(&self, subscription: SubscriptionId, event: &NavigationEvent, failure: &ListenerFailure);
}

/// Default reporter: logs through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, subscription: SubscriptionId, event: &NavigationEvent, failure: &ListenerFailure) {
        tracing::error!(
            subscription = %subscription,
            location = %event.requested,
            error = %failure,
            "Navigation listener failed"
        );
    }
}

/// Listeners in subscription order
#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Vec<(SubscriptionId, Listener)>,
}

impl ListenerRegistry {
    pub(crate) fn insert(&mut self, listener: Listener) -> SubscriptionId {
        let id = Uuid::new_v4();
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Copy of the current list, so dispatch runs without the lock held
    pub(crate) fn snapshot(&self) -> Vec<(SubscriptionId, Listener)> {
        self.entries.clone()
    }
}

pub(crate) type SharedRegistry = Arc<Mutex<ListenerRegistry>>;

pub(crate) fn lock_registry(registry: &Mutex<ListenerRegistry>) -> std::sync::MutexGuard<'_, ListenerRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by `subscribe`
///
/// Dropping the handle keeps the listener registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[must_use = "the handle is the only way to unsubscribe"]
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, registry: &SharedRegistry) -> Self {
        Self {
            id,
            registry: Arc::downgrade(registry),
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the listener; false if it was already gone
    pub fn unsubscribe(self) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                let removed = lock_registry(&registry).remove(self.id);
                if removed {
                    tracing::debug!(subscription = %self.id, "Listener unsubscribed");
                }
                removed
            }
            None => false,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Invoke each listener in order, isolating failures
///
/// Returns the number of listeners that failed.
pub(crate) fn dispatch(
    listeners: &[(SubscriptionId, Listener)],
    event: &NavigationEvent,
    reporter: &dyn ErrorReporter,
) -> usize {
    let mut failures = 0;

    for (id, listener) in listeners {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| listener(event)));
        let failure = match outcome {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => ListenerFailure::Error(e),
            Err(payload) => ListenerFailure::Panic(panic_message(payload.as_ref())),
        };
        failures += 1;
        let reported = panic::catch_unwind(AssertUnwindSafe(|| reporter.report(*id, event, &failure)));
        if reported.is_err() {
            tracing::error!(subscription = %id, error = %failure, "Error reporter panicked");
        }
    }

    failures
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::state::NavigateOptions;
    use crate::routing::{QueryMap, Resolution};

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl ErrorReporter for Collect {
        fn report(&self, _: SubscriptionId, _: &NavigationEvent, failure: &ListenerFailure) {
            self.0.lock().unwrap().push(failure.to_string());
        }
    }

    fn listener(
        f: impl Fn(&NavigationEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Listener {
        Arc::new(f)
    }

    fn event() -> NavigationEvent {
        NavigationEvent {
            current: Resolution::NotFound {
                path: "/x".to_string(),
                query: QueryMap::new(),
            },
            previous: None,
            requested: "/x".to_string(),
            options: NavigateOptions::push(),
        }
    }

    #[test]
    fn test_registry_order_and_removal() {
        let mut registry = ListenerRegistry::default();
        let a = registry.insert(listener(|_| Ok(())));
        let b = registry.insert(listener(|_| Ok(())));

        let ids: Vec<_> = registry.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![a, b]);

        assert!(registry.remove(a));
        assert!(!registry.remove(a));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_dispatch_isolates_failures() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ListenerRegistry::default();

        registry.insert(listener(|_| Err(anyhow::anyhow!("boom"))));
        registry.insert(listener(|_| panic!("kaput")));
        let seen = calls.clone();
        registry.insert(listener(move |e| {
            seen.lock().unwrap().push(e.requested.clone());
            Ok(())
        }));

        let reporter = Collect::default();
        let failures = dispatch(&registry.snapshot(), &event(), &reporter);

        assert_eq!(failures, 2);
        assert_eq!(*calls.lock().unwrap(), vec!["/x".to_string()]);
        let reports = reporter.0.lock().unwrap();
        assert_eq!(reports[0], "listener error: boom");
        assert_eq!(reports[1], "listener panicked: kaput");
    }

    struct PanickingReporter;

    impl ErrorReporter for PanickingReporter {
        fn report(&self, _: SubscriptionId, _: &NavigationEvent, _: &ListenerFailure) {
            panic!("reporter bug");
        }
    }

    #[test]
    fn test_dispatch_survives_panicking_reporter() {
        let calls = Arc::new(Mutex::new(0));
        let mut registry = ListenerRegistry::default();

        registry.insert(listener(|_| anyhow::bail!("render failed")));
        let seen = calls.clone();
        registry.insert(listener(move |_| {
            *seen.lock().unwrap() += 1;
            Ok(())
        }));

        let failures = dispatch(&registry.snapshot(), &event(), &PanickingReporter);
        assert_eq!(failures, 1);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let registry: SharedRegistry = Arc::new(Mutex::new(ListenerRegistry::default()));
        let id = lock_registry(&registry).insert(listener(|_| Ok(())));
        let subscription = Subscription::new(id, &registry);
        drop(registry);
        assert!(!subscription.unsubscribe());
    }
}
