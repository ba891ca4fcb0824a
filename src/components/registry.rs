//! # Component registry.
//!
//! [`Registry`] is the closed, ordered set of component names known to a
//! supervisor, plus the synthetic wildcard (`"all"` by default). It is an
//! explicit value handed to the supervisor, usually derived from the
//! [`Catalog`](crate::Catalog) so that every known name has a constructor.

use std::borrow::Cow;

/// Wildcard token enabling every component.
pub const WILDCARD: &str = "all";

/// Closed set of component names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    wildcard: Cow<'static, str>,
    names: Vec<Cow<'static, str>>,
}

impl Registry {
    /// Creates a registry from a wildcard token and the component names in order.
    ///
    /// Duplicate names and names equal to the wildcard are ignored.
    pub fn new<I, S>(wildcard: impl Into<Cow<'static, str>>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        let wildcard = wildcard.into();
        let mut out: Vec<Cow<'static, str>> = Vec::new();
        for name in names {
            let name = name.into();
            if name != wildcard && !out.contains(&name) {
                out.push(name);
            }
        }
        Self {
            wildcard,
            names: out,
        }
    }

    /// The wildcard token.
    pub fn wildcard(&self) -> &str {
        &self.wildcard
    }

    /// True if `name` is the wildcard.
    pub fn is_wildcard(&self, name: &str) -> bool {
        name == self.wildcard
    }

    /// True if `name` may appear in a selection (a component name or the wildcard).
    pub fn is_known(&self, name: &str) -> bool {
        self.is_wildcard(name) || self.contains(name)
    }

    /// True if `name` is a runnable component name.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Component names in registry order (wildcard excluded).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|n| n.as_ref())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_is_known_but_not_a_component() {
        let reg = Registry::new(WILDCARD, ["gateway", "scheduler"]);
        assert!(reg.is_known("all"));
        assert!(!reg.contains("all"));
        assert!(reg.is_known("gateway"));
        assert!(!reg.is_known("notexist"));
    }

    #[test]
    fn keeps_order_and_drops_duplicates() {
        let reg = Registry::new(WILDCARD, ["b", "a", "b", "all", "c"]);
        assert_eq!(reg.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(reg.len(), 3);
    }
}
