use crate::error::RuntimeError;
use gc_provider::ProviderError;
use gc_types::Block;
use std::sync::mpsc;

type ScanTask = Box<dyn FnOnce() -> Result<Vec<Block>, ProviderError> + Send>;
type Reply = tokio::sync::oneshot::Sender<Result<Vec<Block>, ProviderError>>;

/// A dedicated OS thread draining a queue of scan closures, per spec.md §5:
/// scanners may block on synchronous filesystem or subprocess I/O, so they
/// never run on a `tokio` worker thread.
pub struct ScanWorker {
    tx: mpsc::Sender<(ScanTask, Reply)>,
}

impl ScanWorker {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::channel::<(ScanTask, Reply)>();
        std::thread::Builder::new()
            .name("gc-scan-worker".into())
            .spawn(move || {
                for (task, reply) in rx {
                    let _ = reply.send(task());
                }
            })
            .expect("failed to spawn scanner worker thread");
        ScanWorker { tx }
    }

    /// Runs `task` on the worker thread and awaits its result from the
    /// async side. Resolves to [`RuntimeError::WorkerGone`] if the worker
    /// thread has already exited.
    pub async fn run(&self, task: ScanTask) -> Result<Vec<Block>, RuntimeError> {
        let (reply_tx, reply_rx) = tokio::sync::oneshot::channel();
        self.tx
            .send((task, reply_tx))
            .map_err(|_| RuntimeError::WorkerGone)?;
        reply_rx.await.map_err(|_| RuntimeError::WorkerGone)?.map_err(RuntimeError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_a_task_on_the_worker_thread_and_returns_its_result() {
        let worker = ScanWorker::spawn();
        let blocks = worker
            .run(Box::new(|| {
                Ok(vec![gc_types::Block {
                    dataset: "ds".into(),
                    block_name: "blk".into(),
                    files: vec![],
                    metadata_keys: vec![],
                    locations: None,
                    entries: 0,
                }])
            }))
            .await
            .unwrap();
        assert_eq!(blocks.len(), 1);
    }

    #[tokio::test]
    async fn propagates_a_provider_error() {
        let worker = ScanWorker::spawn();
        let result = worker.run(Box::new(|| Err(ProviderError::NoData))).await;
        assert!(matches!(result, Err(RuntimeError::Provider(ProviderError::NoData))));
    }
}
