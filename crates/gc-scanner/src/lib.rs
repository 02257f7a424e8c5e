//! The Scanner chain: an ordered sequence of transformers over the
//! `(path, metadata, entries, locations, objects)` tuple stream that a
//! dataset's file list is built from.

pub mod builtins;
pub mod chain;
pub mod error;

pub use chain::{Chain, ChainOutcome, Scanner};
pub use error::ScannerError;
