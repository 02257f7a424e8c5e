//! The Splitter: cuts blocks into job-sized partitions and encodes the
//! resulting partition map into the `datamap.tar` archive format.

mod archive;
mod splitter;

pub use archive::{parse_locations, write_partition_map, ArchiveError};
pub use splitter::Splitter;
