//! Navigation
//!
//! Stateful half of the router.
//!
//! ## Architecture
//!
//! - **Router**: owns the navigation state, runs matching, notifies listeners
//! - **Listeners**: ordered observer list with per-listener failure isolation
//! - **MemoryHistory**: in-process history stack kept in sync with the router
//!
//! ## Example
//!
//! ```rust
//! use waypoint::navigation::{NavigateOptions, Router};
//! use waypoint::routing::{RouteDefinition, RouteTable};
//!
//! let table = RouteTable::build(vec![
//!     RouteDefinition::new("/", "Home"),
//!     RouteDefinition::new("/albums/:id", "Album").named("album"),
//! ])
//! .unwrap();
//! let router = Router::new(table);
//!
//! let sub = router.subscribe(|event| {
//!     println!("now showing {:?}", event.current.view());
//!     Ok(())
//! });
//!
//! router.navigate("/albums/3", "", NavigateOptions::push());
//! assert_eq!(router.current().view().unwrap().as_str(), "Album");
//! sub.unsubscribe();
//! ```

mod history;
mod listeners;
mod router;
mod state;

pub use history::{HistoryEntry, MemoryHistory};
pub use listeners::{
    ErrorReporter, Listener, ListenerFailure, LogReporter, Subscription, SubscriptionId,
};
pub use router::{Guard, Router, RouterBuilder, DEFAULT_MAX_REDIRECTS};
pub use state::{NavigateOptions, NavigationEvent, NavigationState};
