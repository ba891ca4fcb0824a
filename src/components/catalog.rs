//! # Component catalog: the ordered constructor table.
//!
//! A [`Catalog`] maps each component name to exactly one constructor. The
//! insertion order is the construction order. The supervisor derives its
//! [`Registry`] from the catalog, so every selectable name can be built.
//!
//! ```text
//! Catalog ─► [runservice, executor, configstore, scheduler, notification, gateway, gitserver]
//!               │
//!               └─► construct(name, &BuildContext) ─► Result<ComponentHandle, ComponentError>
//! ```

use std::borrow::Cow;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::components::component::ComponentHandle;
use crate::components::registry::{Registry, WILDCARD};
use crate::config::Config;
use crate::coordinator::Store;
use crate::error::ComponentError;

/// Everything a constructor may read.
pub struct BuildContext<'a> {
    /// Parsed configuration bundle.
    pub config: &'a Config,
    /// Root cancellation token of the supervisor.
    pub token: &'a CancellationToken,
    /// Store of the embedded coordinator, when one was started.
    pub coordinator: Option<&'a Store>,
}

/// Factory for one component kind.
pub type Constructor =
    Box<dyn Fn(&BuildContext<'_>) -> Result<ComponentHandle, ComponentError> + Send + Sync>;

struct Entry {
    name: Cow<'static, str>,
    build: Constructor,
}

/// Ordered table of component constructors.
#[derive(Default)]
pub struct Catalog {
    entries: Vec<Entry>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a constructor; a later registration under the same name replaces
    /// the earlier one in place.
    ///
    /// The wildcard is not a component name: registering it is ignored.
    pub fn with<F>(mut self, name: impl Into<Cow<'static, str>>, build: F) -> Self
    where
        F: Fn(&BuildContext<'_>) -> Result<ComponentHandle, ComponentError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name == WILDCARD {
            warn!(name = %name, "wildcard cannot be registered as a component");
            return self;
        }
        let build: Constructor = Box::new(build);
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.build = build,
            None => self.entries.push(Entry { name, build }),
        }
        self
    }

    /// Component names in construction order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registry of this catalog's names plus the `"all"` wildcard.
    pub fn registry(&self) -> Registry {
        Registry::new(WILDCARD, self.entries.iter().map(|e| e.name.clone()))
    }

    /// Iterates `(name, constructor)` in construction order.
    pub(crate) fn entries(&self) -> impl Iterator<Item = (&str, &Constructor)> {
        self.entries.iter().map(|e| (e.name.as_ref(), &e.build))
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
