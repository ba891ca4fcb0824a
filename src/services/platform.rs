//! # Platform catalog.
//!
//! The seven platform components, in construction order:
//!
//! | name           | shell            | config section   | side effect at construction |
//! |----------------|------------------|------------------|-----------------------------|
//! | `runservice`   | listener         | `[runservice]`   | creates `data_dir`          |
//! | `executor`     | listener         | `[executor]`     | creates `data_dir`          |
//! | `configstore`  | listener         | `[configstore]`  | creates `data_dir`          |
//! | `scheduler`    | ticker           | `[scheduler]`    | -                           |
//! | `notification` | ticker           | `[notification]` | - (needs the gateway URL)   |
//! | `gateway`      | listener         | `[gateway]`      | -                           |
//! | `gitserver`    | listener         | `[gitserver]`    | creates `data_dir`          |

use std::path::Path;

use crate::components::{BuildContext, Catalog, Component, ComponentHandle};
use crate::config::Config;
use crate::error::ComponentError;
use crate::services::{ListenerService, TickerService};

pub const RUNSERVICE: &str = "runservice";
pub const EXECUTOR: &str = "executor";
pub const CONFIGSTORE: &str = "configstore";
pub const SCHEDULER: &str = "scheduler";
pub const NOTIFICATION: &str = "notification";
pub const GATEWAY: &str = "gateway";
pub const GITSERVER: &str = "gitserver";

/// Catalog of the platform components with their built-in shells.
pub fn platform_catalog() -> Catalog {
    Catalog::new()
        .with(RUNSERVICE, |ctx: &BuildContext<'_>| {
            let c = &ctx.config.runservice;
            prepare_data_dir(RUNSERVICE, &c.data_dir)?;
            Ok(boxed(ListenerService::new(RUNSERVICE, &c.web)?))
        })
        .with(EXECUTOR, |ctx: &BuildContext<'_>| {
            let c = &ctx.config.executor;
            prepare_data_dir(EXECUTOR, &c.data_dir)?;
            Ok(boxed(ListenerService::new(EXECUTOR, &c.web)?))
        })
        .with(CONFIGSTORE, |ctx: &BuildContext<'_>| {
            let c = &ctx.config.configstore;
            prepare_data_dir(CONFIGSTORE, &c.data_dir)?;
            Ok(boxed(ListenerService::new(CONFIGSTORE, &c.web)?))
        })
        .with(SCHEDULER, |ctx: &BuildContext<'_>| {
            Ok(boxed(TickerService::new(SCHEDULER, ctx.config.scheduler.interval_ms)?))
        })
        .with(NOTIFICATION, |ctx: &BuildContext<'_>| {
            require_gateway_url(ctx.config)?;
            Ok(boxed(TickerService::new(
                NOTIFICATION,
                ctx.config.notification.interval_ms,
            )?))
        })
        .with(GATEWAY, |ctx: &BuildContext<'_>| {
            require_gateway_url(ctx.config)?;
            Ok(boxed(ListenerService::new(GATEWAY, &ctx.config.gateway.web)?))
        })
        .with(GITSERVER, |ctx: &BuildContext<'_>| {
            let c = &ctx.config.gitserver;
            prepare_data_dir(GITSERVER, &c.data_dir)?;
            Ok(boxed(ListenerService::new(GITSERVER, &c.web)?))
        })
}

fn boxed(svc: impl Component) -> ComponentHandle {
    Box::new(svc)
}

fn prepare_data_dir(name: &str, dir: &Path) -> Result<(), ComponentError> {
    if dir.as_os_str().is_empty() {
        return Err(ComponentError::config(format!("{name}: data_dir is empty")));
    }
    std::fs::create_dir_all(dir)
        .map_err(|e| ComponentError::io(format!("failed to create data dir {}", dir.display()), e))
}

fn require_gateway_url(config: &Config) -> Result<(), ComponentError> {
    if config.gateway.api_exposed_url.trim().is_empty() {
        return Err(ComponentError::config("gateway api_exposed_url is empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    fn build(name: &str, config: &Config) -> Result<ComponentHandle, ComponentError> {
        let catalog = platform_catalog();
        let token = CancellationToken::new();
        let ctx = BuildContext {
            config,
            token: &token,
            coordinator: None,
        };
        let (_, ctor) = catalog.entries().find(|(n, _)| *n == name).unwrap();
        ctor(&ctx)
    }

    #[test]
    fn construction_order_is_fixed() {
        assert_eq!(
            platform_catalog().names().collect::<Vec<_>>(),
            vec![
                RUNSERVICE,
                EXECUTOR,
                CONFIGSTORE,
                SCHEDULER,
                NOTIFICATION,
                GATEWAY,
                GITSERVER
            ]
        );
    }

    #[test]
    fn storage_components_create_their_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.gitserver.data_dir = dir.path().join("git");

        let handle = build(GITSERVER, &config).unwrap();
        assert_eq!(handle.name(), GITSERVER);
        assert!(dir.path().join("git").is_dir());
    }

    #[test]
    fn gateway_requires_an_exposed_url() {
        let mut config = Config::default();
        config.gateway.api_exposed_url = "  ".into();

        assert!(build(GATEWAY, &config).is_err());
        let err = build(NOTIFICATION, &config).err().unwrap();
        assert_eq!(err.to_string(), "invalid configuration: gateway api_exposed_url is empty");
    }

    #[test]
    fn scheduler_validates_interval() {
        let mut config = Config::default();
        config.scheduler.interval_ms = 0;
        assert_eq!(build(SCHEDULER, &config).err().unwrap().as_label(), "component_config");
    }
}
