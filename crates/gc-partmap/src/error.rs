#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error reading partition map: {0}")]
    Io(#[from] std::io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] gc_splitter::ArchiveError),
    #[error("datamap.tar has no Metadata entry")]
    MissingMetadata,
    #[error("Metadata entry is missing required key {0:?}")]
    MissingMetadataKey(&'static str),
    #[error("Metadata key {key:?} = {value:?} is not a valid integer")]
    InvalidMetadataInt { key: &'static str, value: String },
    #[error("partition number {0} is out of range (MaxJobs = {1})")]
    OutOfRange(usize, usize),
    #[error("shard {0:?} referenced by the index is missing from the archive")]
    MissingShard(String),
}
