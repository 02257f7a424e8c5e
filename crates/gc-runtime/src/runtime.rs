use crate::error::RuntimeError;
use crate::worker::ScanWorker;
use gc_config::PromptSink;
use gc_provider::ProviderError;
use gc_resync::{ResyncEngine, ResyncReport};
use gc_splitter::Splitter;
use gc_types::{Block, CancelToken, PartitionMap};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::instrument;

/// The orchestrator: owns every piece of process-wide state the eight
/// components otherwise can't own themselves (Design Note §9's "global
/// state consolidated into an explicit `Runtime`").
///
/// - the dedicated scanner worker thread ([`ScanWorker`]),
/// - the process-wide [`CancelToken`],
/// - the pipeline lock, so only one resync pass runs at a time,
/// - the current [`PartitionMap`] behind a `parking_lot::RwLock` (reads
///   concurrent, writes exclusive),
/// - the bounded provider query timeout (default 5s, spec.md §5).
pub struct Runtime {
    cancel: CancelToken,
    map: parking_lot::RwLock<PartitionMap>,
    pipeline_lock: tokio::sync::Mutex<()>,
    scan_worker: ScanWorker,
    persist_dir: PathBuf,
    class_name: String,
    provider_timeout: Duration,
}

/// spec.md §5's default provider query timeout.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

impl Runtime {
    pub fn new(persist_dir: impl Into<PathBuf>, class_name: impl Into<String>) -> Self {
        Runtime {
            cancel: CancelToken::new(),
            map: parking_lot::RwLock::new(PartitionMap::new()),
            pipeline_lock: tokio::sync::Mutex::new(()),
            scan_worker: ScanWorker::spawn(),
            persist_dir: persist_dir.into(),
            class_name: class_name.into(),
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Loads the persisted partition map from `persist_dir`, if one exists,
    /// replacing the in-memory one built by [`Runtime::new`]'s empty default.
    pub fn load_persisted(&self) -> Result<(), RuntimeError> {
        let datamap = self.persist_dir.join("datamap.tar");
        if !datamap.exists() {
            return Ok(());
        }
        let store = gc_partmap::PartitionMapStore::open(&self.persist_dir)?;
        *self.map.write() = store.load_all()?;
        Ok(())
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// A cheap clone of the current partition map, safe to read from while
    /// a pass runs concurrently.
    pub fn snapshot(&self) -> PartitionMap {
        self.map.read().clone()
    }

    pub fn persist_dir(&self) -> &Path {
        &self.persist_dir
    }

    /// Runs `scan` on the dedicated scanner worker thread, bounded by the
    /// configured provider timeout.
    async fn query_blocks(
        &self,
        scan: impl FnOnce() -> Result<Vec<Block>, ProviderError> + Send + 'static,
    ) -> Result<Vec<Block>, RuntimeError> {
        match tokio::time::timeout(self.provider_timeout, self.scan_worker.run(Box::new(scan))).await {
            Ok(result) => result,
            Err(_) => Err(RuntimeError::ProviderTimeout(self.provider_timeout)),
        }
    }

    /// Runs one full resync pass: scans for the current block universe,
    /// diffs it against the prior one, and — holding the pipeline lock the
    /// whole time — rewrites the persisted partition map on success. On any
    /// error, the in-memory and on-disk maps are left exactly as they were
    /// (spec.md §7's "prior map intact" guarantee): the map behind the
    /// `RwLock` is only swapped in after both resync and the archive write
    /// succeed.
    #[instrument(skip_all, name = "resync_pass")]
    pub async fn run_pass(
        &self,
        old_blocks: &[Block],
        scan: impl FnOnce() -> Result<Vec<Block>, ProviderError> + Send + 'static,
        splitter: Splitter,
        interactive: bool,
        sink: &dyn PromptSink,
    ) -> Result<ResyncReport, RuntimeError> {
        let _guard = self.pipeline_lock.lock().await;

        let new_blocks = self.query_blocks(scan).await?;
        let old_map = self.snapshot();

        let engine = ResyncEngine::new(splitter, interactive, sink);
        let (new_map, report) = engine.resync(&old_map, old_blocks, &new_blocks, &self.cancel)?;

        gc_splitter::write_partition_map(&self.persist_dir, &new_map, &self.class_name)?;
        *self.map.write() = new_map;

        tracing::info!(
            added = report.added_blocks.len(),
            missing = report.missing_blocks.len(),
            changed = report.changed_blocks.len(),
            "resync pass complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_config::{NonInteractiveSink, PromptKind};

    struct AcceptAllSink;
    impl PromptSink for AcceptAllSink {
        fn confirm(&self, _kind: PromptKind, _message: &str) -> bool {
            true
        }
    }

    fn block(files: Vec<(&str, i64)>) -> Block {
        let files = files
            .into_iter()
            .map(|(url, entries)| {
                let mut f = gc_types::FileRecord::new(url);
                f.entries = entries;
                f
            })
            .collect();
        let mut b = Block {
            dataset: "/PRIVATE/ds".into(),
            block_name: "blk".into(),
            files,
            metadata_keys: vec![],
            locations: None,
            entries: 0,
        };
        b.recompute_entries();
        b
    }

    #[tokio::test]
    async fn a_pass_over_a_new_block_persists_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new(dir.path(), "MyJob");

        let new_block = block(vec![("a.root", 10), ("b.root", 20)]);
        let new_blocks = vec![new_block];
        let sink = AcceptAllSink;

        let report = runtime
            .run_pass(
                &[],
                {
                    let blocks = new_blocks.clone();
                    move || Ok(blocks)
                },
                Splitter::FileBoundary,
                true,
                &sink,
            )
            .await
            .unwrap();

        assert_eq!(report.added_blocks.len(), 1);
        assert_eq!(runtime.snapshot().len(), 2);

        let reloaded = Runtime::new(dir.path(), "MyJob");
        reloaded.load_persisted().unwrap();
        assert_eq!(reloaded.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn a_provider_that_never_returns_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::new(dir.path(), "MyJob").with_provider_timeout(Duration::from_millis(20));
        let sink = NonInteractiveSink;

        let result = runtime
            .run_pass(
                &[],
                || {
                    std::thread::sleep(Duration::from_secs(5));
                    Ok(vec![])
                },
                Splitter::FileBoundary,
                true,
                &sink,
            )
            .await;

        assert!(matches!(result, Err(RuntimeError::ProviderTimeout(_))));
    }
}
