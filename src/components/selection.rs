//! # Selection resolver.
//!
//! A [`Selection`] is the operator's validated request of which components to
//! run. Validation happens once, before any side effect: the list must be
//! non-empty and every entry must be known to the [`Registry`].

use crate::components::registry::Registry;
use crate::error::ServeError;

/// Validated, immutable set of requested component names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    names: Vec<String>,
    all: bool,
}

impl Selection {
    /// Validates `requested` against `registry`.
    ///
    /// Fails with [`ServeError::NoComponents`] on an empty list and with
    /// [`ServeError::UnknownComponent`] on the first unknown name.
    ///
    /// # Example
    /// ```
    /// use servicevisor::{Registry, Selection, ServeError};
    ///
    /// let reg = Registry::new("all", ["gateway", "scheduler"]);
    /// let sel = Selection::resolve(&reg, ["gateway"]).unwrap();
    /// assert!(sel.is_enabled("gateway"));
    /// assert!(!sel.is_enabled("scheduler"));
    ///
    /// let err = Selection::resolve(&reg, ["notexist"]).unwrap_err();
    /// assert!(matches!(err, ServeError::UnknownComponent { .. }));
    /// ```
    pub fn resolve<I, S>(registry: &Registry, requested: I) -> Result<Self, ServeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        let mut all = false;

        for name in requested {
            let name = name.as_ref();
            if !registry.is_known(name) {
                return Err(ServeError::UnknownComponent {
                    name: name.to_string(),
                });
            }
            if registry.is_wildcard(name) {
                all = true;
            } else if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() && !all {
            return Err(ServeError::NoComponents);
        }
        Ok(Self { names, all })
    }

    /// True iff `name` was requested or the wildcard was.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.all || self.names.iter().any(|n| n == name)
    }

    /// True if the wildcard was requested.
    pub fn is_all(&self) -> bool {
        self.all
    }

    /// Enabled component names, in registry order.
    pub fn enabled<'r>(&self, registry: &'r Registry) -> Vec<&'r str> {
        registry.names().filter(|n| self.is_enabled(n)).collect()
    }
}
