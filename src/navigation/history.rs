//! In-memory history
//!
//! Stands in for the browser's history stack. It listens to the router:
//! regular navigations push an entry (dropping any forward entries),
//! `replace` navigations overwrite the current one. `back` and `forward`
//! move the cursor and re-navigate the router so its state follows.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::listeners::Subscription;
use super::router::Router;
use super::state::{NavigateOptions, NavigationEvent};

/// One recorded location
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub location: String,
    pub visited_at: DateTime<Utc>,
}

impl HistoryEntry {
    fn new(location: String) -> Self {
        Self {
            location,
            visited_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
struct HistoryStack {
    entries: Vec<HistoryEntry>,
    index: usize,
}

/// History stack driven by a [`Router`]
pub struct MemoryHistory {
    router: Weak<Router>,
    stack: Mutex<HistoryStack>,
    subscription: Mutex<Option<Subscription>>,
}

impl MemoryHistory {
    /// Start recording the router's navigations
    ///
    /// The router's current location becomes the first entry.
    pub fn attach(router: &Arc<Router>) -> Arc<Self> {
        let history = Arc::new(Self {
            router: Arc::downgrade(router),
            stack: Mutex::new(HistoryStack {
                entries: vec![HistoryEntry::new(router.current().location())],
                index: 0,
            }),
            subscription: Mutex::new(None),
        });

        let weak = Arc::downgrade(&history);
        let subscription = router.subscribe(move |event| {
            if let Some(history) = weak.upgrade() {
                history.record(event);
            }
            Ok(())
        });
        *history
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(subscription);

        tracing::debug!("Memory history attached");
        history
    }

    /// Stop recording; entries are kept
    pub fn detach(&self) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
        }
    }

    /// Step back one entry; false when already at the oldest
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    /// Step forward one entry; false when already at the newest
    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    pub fn can_go_back(&self) -> bool {
        self.lock().index > 0
    }

    pub fn can_go_forward(&self) -> bool {
        let stack = self.lock();
        stack.index + 1 < stack.entries.len()
    }

    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.lock().entries.clone()
    }

    /// Cursor position within [`entries`](Self::entries)
    pub fn index(&self) -> usize {
        self.lock().index
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Location under the cursor
    pub fn current_location(&self) -> Option<String> {
        let stack = self.lock();
        stack.entries.get(stack.index).map(|e| e.location.clone())
    }

    fn record(&self, event: &NavigationEvent) {
        let entry = HistoryEntry::new(event.location());
        let mut stack = self.lock();

        if event.options.replace {
            let index = stack.index;
            if index < stack.entries.len() {
                stack.entries[index] = entry;
            } else {
                stack.entries.push(entry);
            }
        } else {
            let keep = stack.index + 1;
            stack.entries.truncate(keep);
            stack.entries.push(entry);
            stack.index = stack.entries.len() - 1;
        }

        tracing::trace!(index = stack.index, entries = stack.entries.len(), "History updated");
    }

    fn traverse(&self, delta: isize) -> bool {
        let location = {
            let mut stack = self.lock();
            let target = stack.index as isize + delta;
            if target < 0 || target as usize >= stack.entries.len() {
                return false;
            }
            stack.index = target as usize;
            stack.entries[stack.index].location.clone()
        };

        match self.router.upgrade() {
            Some(router) => {
                router.navigate_to(&location, NavigateOptions::replace());
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HistoryStack> {
        self.stack.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
