//! Routing error types
//!
//! Defines the errors raised while building a route table and while turning
//! a route reference back into a concrete path.

use thiserror::Error;

/// Errors detected while building a [`RouteTable`](super::RouteTable)
///
/// These are fatal at startup: a table that fails to build never reaches
/// the navigation controller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Pattern could not be parsed
    #[error("Malformed route pattern '{pattern}': {reason}")]
    MalformedPattern { pattern: String, reason: String },

    /// Two definitions share the same segment structure
    #[error("Ambiguous routes: '{pattern}' duplicates '{existing}'")]
    DuplicatePattern { pattern: String, existing: String },

    /// Two definitions share the same name
    #[error("Duplicate route name: {0}")]
    DuplicateName(String),

    /// Redirect target is malformed or uses parameters the source lacks
    #[error("Invalid redirect on route '{route}': {reason}")]
    InvalidRedirect { route: String, reason: String },
}

/// Errors raised by [`Router::resolve`](crate::navigation::Router::resolve)
///
/// Recoverable: the caller can retry with a different target.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnresolvableRouteError {
    /// No definition carries this name
    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    /// A required parameter was not supplied
    #[error("Route '{route}' requires parameter '{param}'")]
    MissingParameter { route: String, param: String },

    /// A parameter was supplied but empty, which can never match
    #[error("Route '{route}' received an empty value for parameter '{param}'")]
    EmptyParameter { route: String, param: String },
}

/// Result type alias for table construction
pub type ConfigurationResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigurationError::DuplicatePattern {
            pattern: "/users/{uid}".to_string(),
            existing: "/users/:id".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Ambiguous routes: '/users/{uid}' duplicates '/users/:id'"
        );

        let err = UnresolvableRouteError::MissingParameter {
            route: "user".to_string(),
            param: "id".to_string(),
        };
        assert_eq!(err.to_string(), "Route 'user' requires parameter 'id'");
    }
}
