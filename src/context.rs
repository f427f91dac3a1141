//! Context Provider
//!
//! Publishes shared instances to every descendant scope by a well-known key,
//! so deep consumers can reach the router without threading it through
//! every constructor.
//!
//! Scopes form a tree: [`Context::root`] at the composition root,
//! [`Context::child`] for each nested part of the UI. `inject` walks from
//! the asking scope up to the root.
//!
//! ```rust
//! use std::sync::Arc;
//! use waypoint::context::{Context, ContextError, ContextKey};
//!
//! static THEME: ContextKey<String> = ContextKey::new("theme");
//!
//! let root = Context::root();
//! let panel = root.child();
//! assert!(matches!(panel.inject(&THEME), Err(ContextError::MissingProvider(_))));
//!
//! root.provide(&THEME, Arc::new("dark".to_string())).unwrap();
//! assert_eq!(*panel.inject(&THEME).unwrap(), "dark");
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

use crate::navigation::Router;

/// Well-known key under which the application's router is provided
pub static ROUTER_KEY: ContextKey<Router> = ContextKey::new("router");

/// Typed identity for a provided instance
pub struct ContextKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ContextKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for ContextKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContextKey({})", self.name)
    }
}

/// Errors raised by [`Context`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// No scope up to the root provides this key
    #[error("No provider for context key '{0}'")]
    MissingProvider(&'static str),

    /// Key is already provided in this scope or an ancestor
    #[error("Context key '{0}' is already provided")]
    DuplicateProvider(&'static str),

    /// Provided instance is not of the key's type
    #[error("Context key '{0}' holds a value of a different type")]
    TypeMismatch(&'static str),
}

type Provided = Arc<dyn Any + Send + Sync>;

/// One scope in the context tree
pub struct Context {
    parent: Option<Arc<Context>>,
    provided: RwLock<HashMap<&'static str, Provided>>,
}

impl Context {
    /// Scope at the composition root
    pub fn root() -> Arc<Self> {
        Arc::new(Self {
            parent: None,
            provided: RwLock::new(HashMap::new()),
        })
    }

    /// Descendant scope that sees everything this scope sees
    pub fn child(self: &Arc<Self>) -> Arc<Self> {
        Arc::new(Self {
            parent: Some(Arc::clone(self)),
            provided: RwLock::new(HashMap::new()),
        })
    }

    /// Register `instance` under `key`
    ///
    /// A key may be provided once along any root-to-leaf path; providing it
    /// again is a wiring error.
    pub fn provide<T: Any + Send + Sync>(
        &self,
        key: &ContextKey<T>,
        instance: Arc<T>,
    ) -> Result<(), ContextError> {
        if self.lookup(key.name).is_some() {
            return Err(ContextError::DuplicateProvider(key.name));
        }

        self.provided
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.name, instance);

        tracing::debug!(key = key.name, "Context value provided");
        Ok(())
    }

    /// Fetch the instance provided under `key` by this scope or an ancestor
    pub fn inject<T: Any + Send + Sync>(&self, key: &ContextKey<T>) -> Result<Arc<T>, ContextError> {
        let provided = self
            .lookup(key.name)
            .ok_or(ContextError::MissingProvider(key.name))?;
        provided
            .downcast::<T>()
            .map_err(|_| ContextError::TypeMismatch(key.name))
    }

    /// Whether `key` is visible from this scope
    pub fn contains<T>(&self, key: &ContextKey<T>) -> bool {
        self.lookup(key.name).is_some()
    }

    fn lookup(&self, name: &str) -> Option<Provided> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            let found = current
                .provided
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .get(name)
                .cloned();
            if found.is_some() {
                return found;
            }
            scope = current.parent.as_deref();
        }
        None
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<&'static str> = self
            .provided
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .copied()
            .collect();
        f.debug_struct("Context")
            .field("keys", &keys)
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{RouteDefinition, RouteTable};

    static COUNTER: ContextKey<u32> = ContextKey::new("counter");
    static COUNTER_AS_STRING: ContextKey<String> = ContextKey::new("counter");

    fn router() -> Arc<Router> {
        let table = RouteTable::build(vec![RouteDefinition::new("/", "Home")]).unwrap();
        Arc::new(Router::new(table))
    }

    #[test]
    fn test_inject_before_provide_fails() {
        let root = Context::root();
        assert_eq!(
            root.inject(&ROUTER_KEY).unwrap_err(),
            ContextError::MissingProvider("router")
        );
    }

    #[test]
    fn test_inject_returns_same_instance() {
        let root = Context::root();
        let router = router();
        root.provide(&ROUTER_KEY, router.clone()).unwrap();

        let deep = root.child().child().child();
        let injected = deep.inject(&ROUTER_KEY).unwrap();
        assert!(Arc::ptr_eq(&injected, &router));
        assert!(Arc::ptr_eq(&root.inject(&ROUTER_KEY).unwrap(), &router));
    }

    #[test]
    fn test_sibling_scope_does_not_see_child_provider() {
        let root = Context::root();
        let left = root.child();
        let right = root.child();

        left.provide(&COUNTER, Arc::new(1)).unwrap();
        assert_eq!(*left.child().inject(&COUNTER).unwrap(), 1);
        assert!(right.inject(&COUNTER).is_err());
        assert!(!root.contains(&COUNTER));
    }

    #[test]
    fn test_second_provide_rejected() {
        let root = Context::root();
        root.provide(&ROUTER_KEY, router()).unwrap();

        assert_eq!(
            root.provide(&ROUTER_KEY, router()).unwrap_err(),
            ContextError::DuplicateProvider("router")
        );
        // Also from a descendant scope
        assert_eq!(
            root.child().provide(&ROUTER_KEY, router()).unwrap_err(),
            ContextError::DuplicateProvider("router")
        );
    }

    #[test]
    fn test_type_mismatch() {
        let root = Context::root();
        root.provide(&COUNTER, Arc::new(7)).unwrap();
        assert_eq!(
            root.inject(&COUNTER_AS_STRING).unwrap_err(),
            ContextError::TypeMismatch("counter")
        );
    }
}
