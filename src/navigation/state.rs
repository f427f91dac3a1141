//! Navigation state and events

use crate::routing::Resolution;

/// Flags accompanying a navigation request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigateOptions {
    /// Record as a replacement of the current history entry
    pub replace: bool,
    /// Update state without notifying listeners
    pub silent: bool,
}

impl NavigateOptions {
    pub fn push() -> Self {
        Self::default()
    }

    pub fn replace() -> Self {
        Self {
            replace: true,
            silent: false,
        }
    }

    pub fn silent() -> Self {
        Self {
            replace: false,
            silent: true,
        }
    }
}

/// Current and previous resolution, always replaced as a pair
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    pub current: Resolution,
    pub previous: Option<Resolution>,
}

impl NavigationState {
    pub(crate) fn initial(current: Resolution) -> Self {
        Self {
            current,
            previous: None,
        }
    }

    /// State after `next` completes: the old current becomes previous
    pub(crate) fn advance(&self, next: Resolution) -> Self {
        Self {
            current: next,
            previous: Some(self.current.clone()),
        }
    }
}

/// What listeners receive after each non-silent navigation
#[derive(Debug, Clone)]
pub struct NavigationEvent {
    pub current: Resolution,
    pub previous: Option<Resolution>,
    /// Location as requested (`path` or `path?query`), before redirects
    pub requested: String,
    pub options: NavigateOptions,
}

impl NavigationEvent {
    /// Location the navigation settled on
    pub fn location(&self) -> String {
        self.current.location()
    }
}
