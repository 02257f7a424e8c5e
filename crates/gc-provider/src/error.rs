#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider produced no data")]
    NoData,
    #[error("provider configuration error: {0}")]
    Config(#[from] gc_config::ConfigError),
    #[error(transparent)]
    Collision(#[from] gc_hash::NameCollisionError),
    #[error(transparent)]
    Abort(#[from] gc_types::AbortError),
    #[error("every scanner record failed: {0}")]
    AllScansFailed(String),
}
