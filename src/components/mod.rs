//! # Component abstractions, registry and selection.
//!
//! This module provides:
//! - [`Component`] - trait for long-running, cancelable services
//! - [`ComponentFn`] - function-backed component implementation
//! - [`Registry`] - closed set of known names plus the wildcard
//! - [`Selection`] - validated operator request
//! - [`Catalog`] - ordered constructor table

mod catalog;
mod component;
mod component_fn;
mod registry;
mod selection;

pub use catalog::{BuildContext, Catalog, Constructor};
pub use component::{Component, ComponentHandle};
pub use component_fn::ComponentFn;
pub use registry::{Registry, WILDCARD};
pub use selection::Selection;
