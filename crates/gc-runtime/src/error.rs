use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Provider(#[from] gc_provider::ProviderError),
    #[error(transparent)]
    Resync(#[from] gc_resync::ResyncError),
    #[error(transparent)]
    Store(#[from] gc_partmap::StoreError),
    #[error(transparent)]
    Archive(#[from] gc_splitter::ArchiveError),
    #[error("provider query timed out after {0:?}")]
    ProviderTimeout(Duration),
    #[error("the scanner worker thread is gone")]
    WorkerGone,
}
