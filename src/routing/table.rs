//! Route Table
//!
//! Ordered, immutable collection of compiled routes. Insertion order is
//! match priority: the matcher stops at the first structural match.

use std::collections::HashMap;
use std::sync::Arc;

use super::error::{ConfigurationError, ConfigurationResult};
use super::pattern::RoutePattern;
use super::types::{Route, RouteDefinition};

/// Compiled routes in priority order
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Arc<Route>>,
    by_name: HashMap<String, usize>,
}

impl RouteTable {
    /// Build a table from definitions, preserving their order
    ///
    /// Fails on malformed patterns, on two patterns with the same segment
    /// shape, on duplicate names, and on redirects that reference parameters
    /// the source pattern does not bind.
    pub fn build(definitions: Vec<RouteDefinition>) -> ConfigurationResult<Self> {
        let mut routes = Vec::with_capacity(definitions.len());
        let mut by_name = HashMap::new();
        let mut shapes: HashMap<String, String> = HashMap::new();

        for definition in definitions {
            let pattern = RoutePattern::parse(&definition.pattern)?;

            if let Some(existing) = shapes.get(&pattern.shape()) {
                return Err(ConfigurationError::DuplicatePattern {
                    pattern: definition.pattern.clone(),
                    existing: existing.clone(),
                });
            }
            shapes.insert(pattern.shape(), definition.pattern.clone());

            let name = definition
                .name
                .clone()
                .unwrap_or_else(|| pattern.canonical());
            if by_name.contains_key(&name) {
                return Err(ConfigurationError::DuplicateName(name));
            }

            let redirect = match &definition.redirect {
                Some(target) => Some(compile_redirect(&name, &pattern, target)?),
                None => None,
            };

            tracing::trace!(route = %name, pattern = %pattern, "Compiled route");

            by_name.insert(name.clone(), routes.len());
            routes.push(Arc::new(Route {
                name,
                pattern,
                redirect,
                definition,
            }));
        }

        Ok(Self { routes, by_name })
    }

    /// Routes in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Route>> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Look up a route by name
    pub fn get(&self, name: &str) -> Option<&Arc<Route>> {
        self.by_name.get(name).map(|&i| &self.routes[i])
    }
}

fn compile_redirect(
    route: &str,
    source: &RoutePattern,
    target: &str,
) -> ConfigurationResult<RoutePattern> {
    let invalid = |reason: String| ConfigurationError::InvalidRedirect {
        route: route.to_string(),
        reason,
    };

    let target = RoutePattern::parse(target).map_err(|e| invalid(e.to_string()))?;
    if let Some(missing) = target.param_names().find(|p| !source.has_param(p)) {
        return Err(invalid(format!(
            "parameter '{}' is not bound by '{}'",
            missing, source
        )));
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(pattern: &str, view: &str) -> RouteDefinition {
        RouteDefinition::new(pattern, view)
    }

    #[test]
    fn test_build_preserves_order() {
        let table = RouteTable::build(vec![
            def("/", "Home"),
            def("/users/:id", "User"),
            def("/users/new", "NewUser"),
        ])
        .unwrap();

        let patterns: Vec<_> = table.iter().map(|r| r.pattern().as_str()).collect();
        assert_eq!(patterns, vec!["/", "/users/:id", "/users/new"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_default_names() {
        let table = RouteTable::build(vec![
            def("/users/{id}/", "User"),
            def("/settings", "Settings").named("settings"),
        ])
        .unwrap();

        assert_eq!(table.get("/users/:id").unwrap().view().as_str(), "User");
        assert_eq!(table.get("settings").unwrap().view().as_str(), "Settings");
        assert!(table.get("/settings").is_none());
    }

    #[test]
    fn test_duplicate_pattern_rejected() {
        let err = RouteTable::build(vec![def("/users/:id", "A"), def("/users/:id", "B")])
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicatePattern { .. }));

        // Parameter names do not disambiguate
        let err = RouteTable::build(vec![def("/users/:id", "A"), def("/users/{uid}", "B")])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::DuplicatePattern {
                pattern: "/users/{uid}".to_string(),
                existing: "/users/:id".to_string(),
            }
        );

        // Trailing slash is not a distinct route
        let err = RouteTable::build(vec![def("/songs", "A"), def("/songs/", "B")]).unwrap_err();
        assert!(matches!(err, ConfigurationError::DuplicatePattern { .. }));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = RouteTable::build(vec![
            def("/a", "A").named("x"),
            def("/b", "B").named("x"),
        ])
        .unwrap_err();
        assert_eq!(err, ConfigurationError::DuplicateName("x".to_string()));
    }

    #[test]
    fn test_malformed_pattern_rejected() {
        let err = RouteTable::build(vec![def("/users/{id", "User")]).unwrap_err();
        assert!(matches!(err, ConfigurationError::MalformedPattern { .. }));
    }

    #[test]
    fn test_redirect_validation() {
        let table = RouteTable::build(vec![
            def("/old/:id", "Old").redirect("/new/:id"),
            def("/new/:id", "New"),
        ])
        .unwrap();
        assert_eq!(
            table.get("/old/:id").unwrap().redirect().unwrap().canonical(),
            "/new/:id"
        );

        let err = RouteTable::build(vec![def("/old", "Old").redirect("/new/:id")]).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidRedirect { .. }));

        let err = RouteTable::build(vec![def("/old", "Old").redirect("new")]).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidRedirect { .. }));
    }

    #[test]
    fn test_empty_table() {
        let table = RouteTable::build(Vec::new()).unwrap();
        assert!(table.is_empty());
    }
}
