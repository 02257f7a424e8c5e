//! The Partition Map Store: a random-access reader over a persisted
//! `datamap.tar`, keyed by the stable partition number. Writing goes
//! through `gc_splitter::write_partition_map`'s stage-then-rename path;
//! this crate is the load side.

mod error;
mod format;
mod store;

pub use error::StoreError;
pub use format::decode_partition;
pub use store::PartitionMapStore;
