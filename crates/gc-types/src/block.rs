use crate::file::FileRecord;
use std::collections::BTreeSet;

/// A named, ordered group of files belonging to one dataset.
///
/// Invariants (checked by [`Block::validate`]):
/// - every `FileRecord.metadata` has exactly the keys in `metadata_keys`,
/// - `entries == sum(files[i].entries)` when every file's count is known,
///   else `-1`,
/// - `(dataset, block_name)` is the block's identity.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Block {
    pub dataset: String,
    pub block_name: String,
    pub files: Vec<FileRecord>,
    pub metadata_keys: Vec<String>,
    pub locations: Option<BTreeSet<String>>,
    pub entries: i64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BlockInvariantError {
    #[error("file {url} is missing metadata keys declared on its block: {missing:?}")]
    MissingMetadataKeys { url: String, missing: Vec<String> },
    #[error("file {url} carries undeclared metadata keys: {extra:?}")]
    ExtraMetadataKeys { url: String, extra: Vec<String> },
    #[error("block entries is {declared} but files sum to {computed}")]
    EntriesMismatch { declared: i64, computed: i64 },
}

impl Block {
    pub fn identity(&self) -> (&str, &str) {
        (&self.dataset, &self.block_name)
    }

    /// Recomputes `entries` from `files`, per spec: the sum when every file's
    /// count is known, else `-1`.
    pub fn recompute_entries(&mut self) {
        self.entries = sum_entries(&self.files);
    }

    pub fn validate(&self) -> Result<(), BlockInvariantError> {
        for file in &self.files {
            let declared: BTreeSet<&str> = self.metadata_keys.iter().map(String::as_str).collect();
            let present: BTreeSet<&str> = file.metadata.keys().map(String::as_str).collect();

            let missing: Vec<String> = declared
                .difference(&present)
                .map(|s| s.to_string())
                .collect();
            if !missing.is_empty() {
                return Err(BlockInvariantError::MissingMetadataKeys {
                    url: file.url.clone(),
                    missing,
                });
            }
            let extra: Vec<String> = present
                .difference(&declared)
                .map(|s| s.to_string())
                .collect();
            if !extra.is_empty() {
                return Err(BlockInvariantError::ExtraMetadataKeys {
                    url: file.url.clone(),
                    extra,
                });
            }
        }

        let computed = sum_entries(&self.files);
        if self.entries != computed {
            return Err(BlockInvariantError::EntriesMismatch {
                declared: self.entries,
                computed,
            });
        }
        Ok(())
    }
}

pub fn sum_entries(files: &[FileRecord]) -> i64 {
    if files.iter().all(FileRecord::entries_known) {
        files.iter().map(|f| f.entries).sum()
    } else {
        -1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(url: &str, entries: i64) -> FileRecord {
        let mut f = FileRecord::new(url);
        f.entries = entries;
        f
    }

    #[test]
    fn entries_sum_when_all_known() {
        let files = vec![file("a", 10), file("b", 20)];
        assert_eq!(sum_entries(&files), 30);
    }

    #[test]
    fn entries_unknown_if_any_file_unknown() {
        let files = vec![file("a", 10), file("b", -1)];
        assert_eq!(sum_entries(&files), -1);
    }

    #[test]
    fn validate_rejects_metadata_key_mismatch() {
        let mut f = file("a", 1);
        f.metadata.insert("extra".into(), "x".into());
        let block = Block {
            dataset: "ds".into(),
            block_name: "blk".into(),
            files: vec![f],
            metadata_keys: vec![],
            locations: None,
            entries: 1,
        };
        assert!(matches!(
            block.validate(),
            Err(BlockInvariantError::ExtraMetadataKeys { .. })
        ));
    }
}
