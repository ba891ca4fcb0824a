//! servicevisor - run platform components in one supervised process
//!
//! # Usage
//!
//! ```text
//! servicevisor serve --config ./config.toml --components all
//! servicevisor serve --components gateway,scheduler --embedded-coordinator
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter (default `info`)
//! - `SERVICEVISOR_CONFIG`: configuration file path
//! - `SERVICEVISOR_COMPONENTS`: comma-separated component names

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use servicevisor::{
    LogWriter, ServeOptions, Subscribe, Supervisor, SupervisorConfig, platform_catalog,
    wait_for_shutdown_signal,
};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Service supervisor for the platform components
#[derive(Parser, Debug)]
#[command(name = "servicevisor")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the selected components and supervise them until the first one stops
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Config file path
    #[arg(long, env = "SERVICEVISOR_CONFIG", default_value = "./config.toml")]
    config: PathBuf,

    /// List of components to start (specify "all" to start all components)
    #[arg(long, env = "SERVICEVISOR_COMPONENTS", value_delimiter = ',')]
    components: Vec<String>,

    /// Start and use an embedded coordinator, only for testing purpose
    #[arg(long)]
    embedded_coordinator: bool,

    /// Embedded coordinator data dir, only for testing purpose
    #[arg(long, value_name = "DIR", default_value = "/tmp/servicevisor/coordinator")]
    coordinator_data_dir: PathBuf,

    /// Seconds to wait for components to stop after the first one exits
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    grace_secs: u64,
}

impl ServeArgs {
    fn options(&self) -> ServeOptions {
        ServeOptions {
            config: self.config.clone(),
            components: self.components.clone(),
            coordinator_dir: self
                .embedded_coordinator
                .then(|| self.coordinator_data_dir.clone()),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Serve(args) => serve(args).await,
    }
}

async fn serve(args: ServeArgs) -> ExitCode {
    let cfg = SupervisorConfig {
        grace: Duration::from_secs(args.grace_secs),
        ..SupervisorConfig::default()
    };
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let sup = Supervisor::builder(platform_catalog())
        .with_config(cfg)
        .with_subscribers(subs)
        .build();

    let token = sup.cancellation_token();
    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(()) => {
                info!("shutdown signal received");
                token.cancel();
            }
            Err(e) => warn!(error = %e, "failed to install signal handlers"),
        }
    });

    let res = sup.serve(&args.options()).await;
    sup.shutdown().await;

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(label = e.as_label(), "err: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_are_comma_separated() {
        let cli = Cli::parse_from([
            "servicevisor",
            "serve",
            "--components",
            "gateway,scheduler",
        ]);
        let Command::Serve(args) = cli.command;
        assert_eq!(args.components, vec!["gateway", "scheduler"]);
        assert_eq!(args.options().coordinator_dir, None);
    }

    #[test]
    fn embedded_coordinator_uses_data_dir() {
        let cli = Cli::parse_from([
            "servicevisor",
            "serve",
            "--components",
            "all",
            "--embedded-coordinator",
            "--coordinator-data-dir",
            "/var/lib/sv",
        ]);
        let Command::Serve(args) = cli.command;
        assert_eq!(args.options().coordinator_dir, Some(PathBuf::from("/var/lib/sv")));
        assert_eq!(args.grace_secs, 60);
    }
}
