//! # Embedded coordinator.
//!
//! A single-node coordination backend for standalone and test setups, where no
//! external coordination cluster is available.
//!
//! ```text
//! start(data_dir)
//!   ├─► create data_dir
//!   ├─► load <data_dir>/snapshot.json (absent = empty store)
//!   └─► mark ready
//!
//! CoordinatorComponent::run(token)
//!   ├─► ready()          → log "embedded coordinator is ready"
//!   ├─► token.cancelled()
//!   └─► close()          → write snapshot (once)
//! ```

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::CoordinatorError;
use super::store::{Snapshot, Store};
use crate::components::Component;
use crate::error::ComponentError;

const SNAPSHOT_FILE: &str = "snapshot.json";

/// Name the coordinator runs under in the supervisor.
pub const COORDINATOR_NAME: &str = "coordinator";

/// Running embedded coordination backend.
#[derive(Debug)]
pub struct EmbeddedCoordinator {
    data_dir: PathBuf,
    store: Store,
    ready: watch::Sender<bool>,
    closed: AtomicBool,
}

impl EmbeddedCoordinator {
    /// Starts the backend, restoring any snapshot found in `data_dir`.
    pub async fn start(data_dir: impl Into<PathBuf>) -> Result<Self, CoordinatorError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|source| CoordinatorError::CreateDir {
                path: data_dir.clone(),
                source,
            })?;

        let snapshot = load_snapshot(&data_dir.join(SNAPSHOT_FILE)).await?;
        let (ready, _) = watch::channel(false);
        let coordinator = Self {
            data_dir,
            store: Store::from_snapshot(snapshot),
            ready,
            closed: AtomicBool::new(false),
        };
        coordinator.ready.send_replace(true);
        Ok(coordinator)
    }

    /// Resolves once the backend serves requests.
    pub async fn ready(&self) {
        let mut rx = self.ready.subscribe();
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Shared store served by this backend.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Persists the store and releases the backend. Later calls are no-ops.
    pub async fn close(&self) -> Result<(), CoordinatorError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.ready.send_replace(false);

        let path = self.data_dir.join(SNAPSHOT_FILE);
        let bytes = serde_json::to_vec_pretty(&self.store.snapshot().await).map_err(|source| {
            CoordinatorError::EncodeSnapshot {
                path: path.clone(),
                source,
            }
        })?;

        let tmp = path.with_extension("json.tmp");
        let write = async {
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, &path).await
        };
        let res = write.await;
        res.map_err(|source| CoordinatorError::WriteSnapshot { path, source })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

async fn load_snapshot(path: &Path) -> Result<Snapshot, CoordinatorError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::default()),
        Err(source) => {
            return Err(CoordinatorError::ReadSnapshot {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_slice(&bytes).map_err(|source| CoordinatorError::DecodeSnapshot {
        path: path.to_path_buf(),
        source,
    })
}

/// Runs an [`EmbeddedCoordinator`] as a supervised component.
pub struct CoordinatorComponent {
    inner: Arc<EmbeddedCoordinator>,
}

impl CoordinatorComponent {
    pub fn new(inner: Arc<EmbeddedCoordinator>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Component for CoordinatorComponent {
    fn name(&self) -> &str {
        COORDINATOR_NAME
    }

    async fn run(&self, ctx: CancellationToken) -> Result<(), ComponentError> {
        self.inner.ready().await;
        info!(data_dir = %self.inner.data_dir().display(), "embedded coordinator is ready");

        ctx.cancelled().await;
        info!("stopping embedded coordinator");
        self.inner
            .close()
            .await
            .map_err(|e| ComponentError::failed(e.to_string()))?;
        Err(ComponentError::Canceled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn state_survives_close_and_restart() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("coord");

        let coord = EmbeddedCoordinator::start(&data_dir).await.unwrap();
        coord.ready().await;
        coord.store().put("runs/1", "queued").await;
        assert!(coord.store().try_lock("scheduler", "a").await);
        coord.close().await.unwrap();
        assert!(coord.is_closed());
        coord.close().await.unwrap();

        let again = EmbeddedCoordinator::start(&data_dir).await.unwrap();
        assert_eq!(again.store().get("runs/1").await.unwrap().value, "queued");
        assert!(!again.store().try_lock("scheduler", "b").await);
        assert_eq!(again.store().revision().await, 2);
    }

    #[tokio::test]
    async fn corrupt_snapshot_fails_start() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SNAPSHOT_FILE), b"not json").unwrap();

        let err = EmbeddedCoordinator::start(dir.path()).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::DecodeSnapshot { .. }));
    }

    #[tokio::test]
    async fn data_dir_under_a_file_fails_start() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, b"x").unwrap();

        let err = EmbeddedCoordinator::start(file.join("coord")).await.unwrap_err();
        assert_eq!(err.as_label(), "coordinator_create_dir");
    }

    #[tokio::test]
    async fn component_closes_on_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let coord = Arc::new(EmbeddedCoordinator::start(dir.path()).await.unwrap());
        let component = CoordinatorComponent::new(Arc::clone(&coord));

        let token = CancellationToken::new();
        let run = tokio::spawn({
            let token = token.clone();
            async move { component.run(token).await }
        });
        token.cancel();

        let res = run.await.unwrap();
        assert!(res.unwrap_err().is_canceled());
        assert!(coord.is_closed());
        assert!(dir.path().join(SNAPSHOT_FILE).exists());
    }
}
