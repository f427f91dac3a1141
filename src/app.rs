//! Application Composition Root
//!
//! Wires configuration, route table, router and context together once at
//! startup. Consumers get the router either explicitly from
//! [`Application::router`] or by injecting [`ROUTER_KEY`] from any scope
//! below [`Application::context`].

use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::context::{Context, ContextError, ROUTER_KEY};
use crate::navigation::{ErrorReporter, MemoryHistory, Router};

/// Startup failures; all of them are wiring or configuration bugs
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Context error: {0}")]
    Context(#[from] ContextError),
}

/// A fully wired application instance
pub struct Application {
    router: Arc<Router>,
    context: Arc<Context>,
    history: Option<Arc<MemoryHistory>>,
}

impl Application {
    /// Build the table, the router and the root context from `config`
    pub fn bootstrap(config: &Config) -> Result<Self, AppError> {
        Self::bootstrap_with(config, None)
    }

    /// Same as [`bootstrap`](Self::bootstrap) with a custom listener-failure reporter
    pub fn bootstrap_with(
        config: &Config,
        reporter: Option<Arc<dyn ErrorReporter>>,
    ) -> Result<Self, AppError> {
        let table = config.route_table()?;
        let routes = table.len();

        let mut builder = Router::builder(table)
            .initial_location(config.router.initial_path.clone())
            .max_redirects(config.router.max_redirects);
        if let Some(reporter) = reporter {
            builder = builder.reporter(reporter);
        }
        let router = Arc::new(builder.build());

        let context = Context::root();
        context.provide(&ROUTER_KEY, Arc::clone(&router))?;

        tracing::info!(
            routes,
            initial = %router.current(),
            "Application bootstrapped"
        );

        Ok(Self {
            router,
            context,
            history: None,
        })
    }

    /// Record navigations in an in-memory history stack
    pub fn with_history(mut self) -> Self {
        if self.history.is_none() {
            self.history = Some(MemoryHistory::attach(&self.router));
        }
        self
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Root scope; create children for nested consumers
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    pub fn history(&self) -> Option<&Arc<MemoryHistory>> {
        self.history.as_ref()
    }
}
