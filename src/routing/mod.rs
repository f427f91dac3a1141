//! Waypoint Routing
//!
//! Static half of the router: compiling route definitions and matching
//! locations against them. Everything here is immutable or pure.
//!
//! - **pattern**: path template parser (`/users/:id`, `/users/{id}`)
//! - **table**: ordered route table built once at startup
//! - **matcher**: first-match path matching with parameter binding
//! - **query**: query string parsing
//! - **types**: definitions, compiled routes, match results
//! - **error**: configuration and resolution errors
//!
//! # Data Flow
//!
//! ```text
//! Startup:
//!   RouteDefinition[] → RoutePattern::parse → RouteTable (frozen)
//!
//! Per navigation:
//!   (path, query) → match_path → Resolution::Matched | Resolution::NotFound
//! ```
//!
//! # Example
//!
//! ```rust
//! use waypoint::routing::{match_path, RouteDefinition, RouteTable};
//!
//! let table = RouteTable::build(vec![
//!     RouteDefinition::new("/users/:id", "UserDetail"),
//!     RouteDefinition::new("/users/new", "NewUser"),
//! ])
//! .unwrap();
//!
//! // Order decides: the parameter route shadows the literal one
//! let resolution = match_path(&table, "/users/new", "");
//! assert_eq!(resolution.as_match().unwrap().param("id"), Some("new"));
//! ```

pub mod error;
pub mod matcher;
pub mod pattern;
pub mod query;
pub mod table;
pub mod types;

pub use error::{ConfigurationError, ConfigurationResult, UnresolvableRouteError};
pub use matcher::{match_path, match_with_query, normalize_path, split_location};
pub use pattern::{RoutePattern, Segment};
pub use query::{parse_query, QueryMap, QueryValue};
pub use table::RouteTable;
pub use types::{MatchResult, Meta, Resolution, Route, RouteDefinition, ViewId};
