//! The orchestrator crate: wires the Scanner/Provider/Hash/Splitter/Resync
//! components into one process, owning the pipeline lock, the cancel
//! token, and the persisted partition map.

mod error;
mod runtime;
mod worker;

pub use error::RuntimeError;
pub use runtime::{Runtime, DEFAULT_PROVIDER_TIMEOUT};
