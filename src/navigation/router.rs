//! Navigation Controller
//!
//! The only stateful part of the router. Owns the current
//! [`NavigationState`], runs the matcher on every navigation, and notifies
//! listeners synchronously in subscription order.
//!
//! # Navigation pipeline
//!
//! ```text
//! navigate(path, query, options)
//!     → queue (calls made while another navigation is dispatching wait here)
//!     → match_with_query
//!     → guard for the matched route (false → NotFound)
//!     → redirect? re-match the interpolated target (bounded hops)
//!     → swap state: previous = current, current = result (single write)
//!     → unless silent: notify listeners, isolating failures
//! ```

use std::collections::{HashMap, VecDeque};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use super::listeners::{
    dispatch, lock_registry, ErrorReporter, ListenerRegistry, LogReporter, SharedRegistry,
    Subscription,
};
use super::state::{NavigateOptions, NavigationEvent, NavigationState};
use crate::routing::{
    match_with_query, split_location, MatchResult, QueryMap, Resolution, RouteTable,
    UnresolvableRouteError,
};

/// Default bound on redirect hops per navigation
pub const DEFAULT_MAX_REDIRECTS: usize = 8;

/// Per-route predicate; returning false turns the match into `NotFound`
pub type Guard = Arc<dyn Fn(&MatchResult) -> bool + Send + Sync>;

/// A navigation waiting to run
struct PendingNavigation {
    path: String,
    query: QueryMap,
    requested: String,
    options: NavigateOptions,
}

#[derive(Default)]
struct NavigationQueue {
    pending: VecDeque<PendingNavigation>,
    draining: bool,
}

/// Clears the draining flag if a navigation unwinds mid-drain
struct DrainGuard<'a> {
    queue: &'a Mutex<NavigationQueue>,
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .draining = false;
        }
    }
}

/// Result of one matching step
enum Step {
    Settled(Resolution),
    Follow { path: String, query: QueryMap },
}

/// Client-side router
///
/// Share it with `Arc`. All operations take `&self`.
pub struct Router {
    table: Arc<RouteTable>,
    state: RwLock<NavigationState>,
    listeners: SharedRegistry,
    queue: Mutex<NavigationQueue>,
    guards: HashMap<String, Guard>,
    reporter: Arc<dyn ErrorReporter>,
    max_redirects: usize,
}

/// Builder for [`Router`]
pub struct RouterBuilder {
    table: Arc<RouteTable>,
    initial_location: String,
    max_redirects: usize,
    reporter: Arc<dyn ErrorReporter>,
    guards: HashMap<String, Guard>,
}

impl RouterBuilder {
    /// Location resolved to produce the initial state (default `/`)
    pub fn initial_location(mut self, location: impl Into<String>) -> Self {
        self.initial_location = location.into();
        self
    }

    pub fn max_redirects(mut self, hops: usize) -> Self {
        self.max_redirects = hops;
        self
    }

    /// Where listener failures are sent (default: [`LogReporter`])
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Attach a guard to the route with this name
    pub fn guard(
        mut self,
        route: impl Into<String>,
        guard: impl Fn(&MatchResult) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.guards.insert(route.into(), Arc::new(guard));
        self
    }

    pub fn build(self) -> Router {
        for name in self.guards.keys() {
            if self.table.get(name).is_none() {
                tracing::warn!(route = %name, "Guard registered for unknown route");
            }
        }

        let mut router = Router {
            table: self.table,
            state: RwLock::new(NavigationState::initial(Resolution::NotFound {
                path: String::new(),
                query: QueryMap::new(),
            })),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
            queue: Mutex::new(NavigationQueue::default()),
            guards: self.guards,
            reporter: self.reporter,
            max_redirects: self.max_redirects,
        };

        let (path, query) = split_location(&self.initial_location);
        let initial = router.settle(path, QueryMap::parse(query));
        tracing::debug!(location = %self.initial_location, resolution = %initial, "Router initialised");
        *router
            .state
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = NavigationState::initial(initial);

        router
    }
}

impl Router {
    /// Router over `table` with default settings
    pub fn new(table: RouteTable) -> Self {
        Self::builder(table).build()
    }

    pub fn builder(table: impl Into<Arc<RouteTable>>) -> RouterBuilder {
        RouterBuilder {
            table: table.into(),
            initial_location: "/".to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
            reporter: Arc::new(LogReporter),
            guards: HashMap::new(),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Navigate to `path` with a raw query string
    ///
    /// Never fails: an unmatched path leaves the router in the not-found
    /// state. A call made while another navigation is notifying listeners
    /// runs once that navigation has completed.
    ///
    /// Navigations are drained by whichever caller started draining. A call
    /// from another thread during that time is queued and returns before it
    /// is applied; its listeners then run on the draining thread.
    pub fn navigate(&self, path: &str, query: &str, options: NavigateOptions) {
        let requested = if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query.strip_prefix('?').unwrap_or(query))
        };
        self.enqueue(PendingNavigation {
            path: path.to_string(),
            query: QueryMap::parse(query),
            requested,
            options,
        });
    }

    /// Navigate to a full location (`/path?query#fragment`)
    pub fn navigate_to(&self, location: &str, options: NavigateOptions) {
        let (path, query) = split_location(location);
        self.navigate(path, query, options);
    }

    /// Resolution of the most recent completed navigation
    pub fn current(&self) -> Resolution {
        self.read_state().current.clone()
    }

    pub fn previous(&self) -> Option<Resolution> {
        self.read_state().previous.clone()
    }

    /// Consistent snapshot of current and previous
    pub fn state(&self) -> NavigationState {
        self.read_state().clone()
    }

    /// Register a listener for future navigations
    ///
    /// The listener is not called for the current state.
    pub fn subscribe(
        &self,
        listener: impl Fn(&NavigationEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Subscription {
        let id = lock_registry(&self.listeners).insert(Arc::new(listener));
        tracing::debug!(subscription = %id, "Listener subscribed");
        Subscription::new(id, &self.listeners)
    }

    pub fn listener_count(&self) -> usize {
        lock_registry(&self.listeners).len()
    }

    /// Build the path for a named route
    pub fn resolve(
        &self,
        name: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, UnresolvableRouteError> {
        let route = self
            .table
            .get(name)
            .ok_or_else(|| UnresolvableRouteError::UnknownRoute(name.to_string()))?;
        route.pattern().interpolate(route.name(), params)
    }

    /// Like [`resolve`](Self::resolve), with a query string appended
    pub fn resolve_with_query(
        &self,
        name: &str,
        params: &HashMap<String, String>,
        query: &QueryMap,
    ) -> Result<String, UnresolvableRouteError> {
        let path = self.resolve(name, params)?;
        if query.is_empty() {
            Ok(path)
        } else {
            Ok(format!("{}?{}", path, query.to_query_string()))
        }
    }

    fn enqueue(&self, request: PendingNavigation) {
        {
            let mut queue = self.lock_queue();
            queue.pending.push_back(request);
            if queue.draining {
                tracing::trace!(pending = queue.pending.len(), "Navigation queued");
                return;
            }
            queue.draining = true;
        }

        let _guard = DrainGuard { queue: &self.queue };
        loop {
            let next = {
                let mut queue = self.lock_queue();
                match queue.pending.pop_front() {
                    Some(next) => next,
                    None => {
                        queue.draining = false;
                        break;
                    }
                }
            };
            self.run(next);
        }
    }

    fn run(&self, request: PendingNavigation) {
        let resolution = self.settle(&request.path, request.query);

        let next = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let next = state.advance(resolution);
            *state = next.clone();
            next
        };

        tracing::debug!(
            requested = %request.requested,
            resolution = %next.current,
            replace = request.options.replace,
            silent = request.options.silent,
            "Navigated"
        );

        if request.options.silent {
            return;
        }

        let event = NavigationEvent {
            current: next.current,
            previous: next.previous,
            requested: request.requested,
            options: request.options,
        };
        let listeners = lock_registry(&self.listeners).snapshot();
        let failures = dispatch(&listeners, &event, self.reporter.as_ref());
        if failures > 0 {
            tracing::debug!(failures, listeners = listeners.len(), "Listeners failed during notification");
        }
    }

    /// Match, then apply guards and follow redirects
    fn settle(&self, path: &str, query: QueryMap) -> Resolution {
        let mut resolution = match_with_query(&self.table, path, query);
        let mut hops = 0;

        loop {
            match self.step(resolution, hops) {
                Step::Settled(done) => return done,
                Step::Follow { path, query } => {
                    hops += 1;
                    resolution = match_with_query(&self.table, &path, query);
                }
            }
        }
    }

    fn step(&self, resolution: Resolution, hops: usize) -> Step {
        let matched = match resolution {
            Resolution::Matched(m) => m,
            not_found => return Step::Settled(not_found),
        };

        if !self.guard_allows(&matched) {
            tracing::debug!(route = %matched.route.name(), path = %matched.path, "Guard rejected navigation");
            return Step::Settled(not_found_for(matched));
        }

        let target = match matched.route.redirect() {
            Some(target) => target,
            None => return Step::Settled(Resolution::Matched(matched)),
        };

        if hops >= self.max_redirects {
            tracing::warn!(
                route = %matched.route.name(),
                max_redirects = self.max_redirects,
                "Redirect limit reached"
            );
            return Step::Settled(not_found_for(matched));
        }

        match target.interpolate(matched.route.name(), &matched.params) {
            Ok(path) => {
                tracing::debug!(from = %matched.path, to = %path, "Following redirect");
                Step::Follow {
                    path,
                    query: matched.query,
                }
            }
            Err(e) => {
                tracing::warn!(route = %matched.route.name(), error = %e, "Redirect could not be resolved");
                Step::Settled(not_found_for(matched))
            }
        }
    }

    fn guard_allows(&self, matched: &MatchResult) -> bool {
        let guard = match self.guards.get(matched.route.name()) {
            Some(guard) => guard,
            None => return true,
        };

        match panic::catch_unwind(AssertUnwindSafe(|| guard(matched))) {
            Ok(allowed) => allowed,
            Err(_) => {
                tracing::error!(route = %matched.route.name(), "Route guard panicked; treating as rejection");
                false
            }
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, NavigationState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_queue(&self) -> MutexGuard<'_, NavigationQueue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.table.len())
            .field("current", &self.read_state().current.to_string())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

fn not_found_for(matched: MatchResult) -> Resolution {
    Resolution::NotFound {
        path: matched.path,
        query: matched.query,
    }
}
