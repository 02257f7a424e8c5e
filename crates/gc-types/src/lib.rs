//! Shared data model for the dataset ingestion and partitioning pipeline:
//! file records, blocks, content hashes, partitions, and the cooperative
//! cancellation / error-collection primitives every other `gc-*` crate
//! builds on.

pub mod block;
pub mod cancel;
pub mod error;
pub mod file;
pub mod hash;
pub mod partition;

pub use block::Block;
pub use cancel::CancelToken;
pub use error::{AbortError, ErrorCollector};
pub use file::FileRecord;
pub use hash::{seed_digest, seeded_digest, BlockHash, DatasetHash, Digest};
pub use partition::{Partition, PartitionMap};

/// The 5-tuple a scanner chain passes from stage to stage:
/// `(path, metadata, entries, locations, objects)`.
pub type FileTuple = (
    Option<String>,
    std::collections::BTreeMap<String, String>,
    Option<i64>,
    Option<std::collections::BTreeSet<String>>,
    serde_json::Map<String, serde_json::Value>,
);

/// The seed tuple every scanner chain starts from.
pub fn seed_tuple() -> FileTuple {
    (
        None,
        std::collections::BTreeMap::new(),
        None,
        None,
        serde_json::Map::new(),
    )
}
