//! Data providers: assemble a scanner chain for a dataset expression, run
//! it, and fold the result into named dataset/block groups via `gc-hash`.

mod base;
mod error;
mod gc_provider;
mod scan_provider;

pub use base::ScanProviderBase;
pub use error::ProviderError;
pub use gc_provider::GCProvider;
pub use scan_provider::ScanProvider;
