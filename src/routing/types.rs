//! Core routing types
//!
//! - `RouteDefinition`: declarative route as it appears in configuration
//! - `Route`: a definition after its pattern has been compiled
//! - `MatchResult` / `Resolution`: outcome of matching one location

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::pattern::RoutePattern;
use super::query::QueryMap;

/// Identifier of the view a route renders
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Opaque per-route metadata
pub type Meta = HashMap<String, serde_json::Value>;

/// A route as supplied by configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Identity used by `resolve`; defaults to the canonical pattern
    #[serde(default)]
    pub name: Option<String>,
    /// Path template, e.g. `/users/:id`
    pub pattern: String,
    /// View rendered when this route matches
    pub view: ViewId,
    #[serde(default)]
    pub meta: Meta,
    /// Template to redirect to; may reuse the pattern's parameters
    #[serde(default)]
    pub redirect: Option<String>,
}

impl RouteDefinition {
    pub fn new(pattern: impl Into<String>, view: impl Into<ViewId>) -> Self {
        Self {
            name: None,
            pattern: pattern.into(),
            view: view.into(),
            meta: Meta::new(),
            redirect: None,
        }
    }

    /// Builder method: set the route name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method: add a metadata entry
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }

    /// Builder method: redirect to another template
    pub fn redirect(mut self, target: impl Into<String>) -> Self {
        self.redirect = Some(target.into());
        self
    }
}

/// A compiled route held by the table
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub(crate) name: String,
    pub(crate) pattern: RoutePattern,
    pub(crate) redirect: Option<RoutePattern>,
    pub(crate) definition: RouteDefinition,
}

impl Route {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn view(&self) -> &ViewId {
        &self.definition.view
    }

    pub fn meta(&self) -> &Meta {
        &self.definition.meta
    }

    pub fn redirect(&self) -> Option<&RoutePattern> {
        self.redirect.as_ref()
    }

    pub fn definition(&self) -> &RouteDefinition {
        &self.definition
    }
}

/// A successful match of a location against a route
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub route: Arc<Route>,
    /// Parameter values, percent-decoded
    pub params: HashMap<String, String>,
    pub query: QueryMap,
    /// The normalised path that matched
    pub path: String,
}

impl MatchResult {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Outcome of matching: a route, or the not-found sentinel
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Matched(MatchResult),
    /// No route matched; carries no route binding
    NotFound { path: String, query: QueryMap },
}

impl Resolution {
    pub fn is_matched(&self) -> bool {
        matches!(self, Resolution::Matched(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Resolution::NotFound { .. })
    }

    pub fn as_match(&self) -> Option<&MatchResult> {
        match self {
            Resolution::Matched(m) => Some(m),
            Resolution::NotFound { .. } => None,
        }
    }

    pub fn route(&self) -> Option<&Route> {
        self.as_match().map(|m| m.route.as_ref())
    }

    pub fn view(&self) -> Option<&ViewId> {
        self.route().map(Route::view)
    }

    pub fn path(&self) -> &str {
        match self {
            Resolution::Matched(m) => &m.path,
            Resolution::NotFound { path, .. } => path,
        }
    }

    pub fn query(&self) -> &QueryMap {
        match self {
            Resolution::Matched(m) => &m.query,
            Resolution::NotFound { query, .. } => query,
        }
    }

    /// Path plus query string, as a history entry would record it
    pub fn location(&self) -> String {
        let query = self.query().to_query_string();
        if query.is_empty() {
            self.path().to_string()
        } else {
            format!("{}?{}", self.path(), query)
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Matched(m) => write!(
                f,
                "{} -> {} ({})",
                m.path,
                m.route.view(),
                m.route.name()
            ),
            Resolution::NotFound { path, .. } => write!(f, "{} -> not found", path),
        }
    }
}
