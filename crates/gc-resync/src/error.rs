#[derive(Debug, thiserror::Error)]
pub enum ResyncError {
    #[error("the resync pass was cancelled")]
    Abort(#[from] gc_types::AbortError),
    #[error("partition count mismatch: expected {expected}, computed {computed}")]
    IntegrityPartitionCountMismatch { expected: usize, computed: usize },
    #[error(transparent)]
    Catalog(#[from] crate::catalog::CatalogError),
}
