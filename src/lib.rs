//! # Waypoint
//!
//! Client-side router for single-page applications: resolves URL paths to
//! views, owns navigation state, and tells the rest of the UI when it
//! changes.
//!
//! ## Features
//!
//! - **Ordered matching**: first structural match wins, with named parameters
//! - **Atomic navigation**: consumers never see a route with foreign params
//! - **Isolated listeners**: a failing subscriber never blocks the others
//! - **Reverse routing**: build paths from route names and parameters
//! - **Context injection**: one router per application, reachable from any scope
//!
//! ## Modules
//!
//! - [`routing`]: route table, pattern parser, path matcher, query parser
//! - [`navigation`]: router, listeners, in-memory history
//! - [`context`]: scoped, key-addressed provider
//! - [`app`]: composition root
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust
//! use waypoint::{Application, Config, NavigateOptions, ROUTER_KEY};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = Application::bootstrap(&Config::default())?;
//!
//!     // Deep in the view tree
//!     let router = app.context().child().inject(&ROUTER_KEY)?;
//!     let _sub = router.subscribe(|event| {
//!         println!("render {:?}", event.current.view());
//!         Ok(())
//!     });
//!
//!     router.navigate("/albums/42", "", NavigateOptions::push());
//!     assert_eq!(router.current().view().unwrap().as_str(), "Album");
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod navigation;
pub mod routing;

// Re-export top-level types for convenience
pub use routing::{
    match_path, ConfigurationError, MatchResult, QueryMap, QueryValue, Resolution, Route,
    RouteDefinition, RoutePattern, RouteTable, UnresolvableRouteError, ViewId,
};

pub use navigation::{
    ErrorReporter, HistoryEntry, ListenerFailure, LogReporter, MemoryHistory, NavigateOptions,
    NavigationEvent, NavigationState, Router, RouterBuilder, Subscription,
};

pub use context::{Context, ContextError, ContextKey, ROUTER_KEY};

pub use app::{AppError, Application};

pub use config::{Config, ConfigError, LoggingConfig, RouterConfig};
