//! Error types used by the servicevisor runtime and components.
//!
//! This module defines two main error enums:
//!
//! - [`ServeError`]: errors that end a launch (selection, config, startup, runtime).
//! - [`ComponentError`]: errors raised by a single component constructor or run.
//!
//! Both types provide `as_label` for logging.

use thiserror::Error;

use crate::config::ConfigError;
use crate::coordinator::CoordinatorError;

/// # Errors that terminate a launch.
///
/// Every variant carries enough context (phase and component) to be actionable
/// by the single top-level caller, which logs it and exits.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ServeError {
    /// The selection was empty, or nothing was left to launch.
    #[error("no enabled components")]
    NoComponents,

    /// A selected name is not in the registry.
    #[error("unknown component name {name:?}")]
    UnknownComponent {
        /// The offending name, as given by the operator.
        name: String,
    },

    /// The configuration bundle could not be loaded.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The embedded coordination backend failed to start.
    #[error("failed to start embedded coordinator: {0}")]
    Coordinator(#[from] CoordinatorError),

    /// A constructor rejected its configuration or failed to allocate resources.
    #[error("failed to construct {component}: {source}")]
    Construct {
        /// Name of the failing component.
        component: String,
        /// Underlying constructor error.
        #[source]
        source: ComponentError,
    },

    /// A running component returned an error; terminal for the whole process.
    #[error("component {component} exited: {source}")]
    Run {
        /// Name of the component whose outcome arrived first.
        component: String,
        /// Error returned by the component's `run`.
        #[source]
        source: ComponentError,
    },
}

impl ServeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use servicevisor::ServeError;
    ///
    /// let err = ServeError::UnknownComponent { name: "notexist".into() };
    /// assert_eq!(err.as_label(), "serve_unknown_component");
    /// assert_eq!(err.to_string(), r#"unknown component name "notexist""#);
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ServeError::NoComponents => "serve_no_components",
            ServeError::UnknownComponent { .. } => "serve_unknown_component",
            ServeError::Config(_) => "serve_config",
            ServeError::Coordinator(_) => "serve_coordinator",
            ServeError::Construct { .. } => "serve_construct",
            ServeError::Run { .. } => "serve_run",
        }
    }

    /// Name of the component this error is attributed to, if any.
    pub fn component(&self) -> Option<&str> {
        match self {
            ServeError::Construct { component, .. } | ServeError::Run { component, .. } => {
                Some(component)
            }
            _ => None,
        }
    }
}

/// # Errors produced by a component.
///
/// Returned both by constructors (during the sequential construction phase)
/// and by [`Component::run`](crate::Component::run).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ComponentError {
    /// The component's configuration subsection is invalid.
    #[error("invalid configuration: {error}")]
    Config {
        /// What is wrong with the configuration.
        error: String,
    },

    /// An I/O operation failed (binding a port, creating a data directory, ...).
    #[error("{context}: {source}")]
    Io {
        /// What the component was doing.
        context: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Component-specific failure.
    #[error("{error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The component panicked while running.
    #[error("panicked: {info}")]
    Panicked {
        /// Panic payload, when it was a string.
        info: String,
    },

    /// The component stopped because the root token was cancelled.
    #[error("context cancelled")]
    Canceled,
}

impl ComponentError {
    /// Shorthand for [`ComponentError::Failed`].
    pub fn failed(error: impl Into<String>) -> Self {
        ComponentError::Failed {
            error: error.into(),
        }
    }

    /// Shorthand for [`ComponentError::Config`].
    pub fn config(error: impl Into<String>) -> Self {
        ComponentError::Config {
            error: error.into(),
        }
    }

    /// Shorthand for [`ComponentError::Io`].
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ComponentError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use servicevisor::ComponentError;
    ///
    /// let err = ComponentError::failed("port in use");
    /// assert_eq!(err.as_label(), "component_failed");
    /// assert_eq!(err.to_string(), "port in use");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            ComponentError::Config { .. } => "component_config",
            ComponentError::Io { .. } => "component_io",
            ComponentError::Failed { .. } => "component_failed",
            ComponentError::Panicked { .. } => "component_panicked",
            ComponentError::Canceled => "component_canceled",
        }
    }

    /// `Canceled` is a graceful stop rather than a failure.
    pub fn is_canceled(&self) -> bool {
        matches!(self, ComponentError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construct_error_names_the_component() {
        let err = ServeError::Construct {
            component: "gateway".into(),
            source: ComponentError::config("api_exposed_url is empty"),
        };
        assert_eq!(err.component(), Some("gateway"));
        assert_eq!(
            err.to_string(),
            "failed to construct gateway: invalid configuration: api_exposed_url is empty"
        );
    }

    #[test]
    fn no_components_message() {
        assert_eq!(ServeError::NoComponents.to_string(), "no enabled components");
        assert_eq!(ServeError::NoComponents.component(), None);
    }

    #[test]
    fn canceled_is_graceful() {
        assert!(ComponentError::Canceled.is_canceled());
        assert!(!ComponentError::failed("boom").is_canceled());
    }
}
