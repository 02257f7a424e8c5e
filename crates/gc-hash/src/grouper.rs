use gc_types::{seeded_digest, Block, BlockHash, DatasetHash, FileRecord, FileTuple};
use std::collections::{BTreeMap, BTreeSet};

/// Configuration that drives how files are folded into dataset/block hash
/// keys, grounded on `ScanProviderBase.__init__`'s `hash_input_set_dataset`
/// / `hash_input_set_block` assembly.
pub struct HashKeyConfig {
    /// Seed fed to the dataset hash ahead of the selected metadata values:
    /// `md5(repr(dataset_expr)) + md5(repr(dataset_nick_override))`.
    pub dataset_seed: String,
    pub dataset_keys: Vec<String>,
    pub block_keys: Vec<String>,
    /// If non-empty, only files whose dataset hash is in this set survive.
    pub selected_dataset_hashes: BTreeSet<DatasetHash>,
    /// If non-empty, only files whose block hash is in this set survive.
    pub selected_block_hashes: BTreeSet<BlockHash>,
}

type BlockKey = (DatasetHash, BlockHash);

/// The raw result of folding a file stream into dataset/block buckets,
/// before names have been assigned (`_assign_dataset_block` in the
/// original).
#[derive(Default)]
pub struct Assignment {
    pub files_by_block: BTreeMap<BlockKey, Vec<FileRecord>>,
    pub dataset_metadata: BTreeMap<DatasetHash, BTreeMap<String, String>>,
    pub block_metadata: BTreeMap<BlockKey, BTreeMap<String, String>>,
}

/// Keeps only the key/value pairs present in both dicts with equal values.
/// Mirrors the original's `intersect_first_dict`, used to prune each
/// dataset/block's metadata down to what every member file agrees on.
fn intersect_first_dict(acc: &mut BTreeMap<String, String>, next: &BTreeMap<String, String>) {
    acc.retain(|key, value| next.get(key) == Some(value));
}

/// Folds a stream of `(path, metadata, entries, locations, objects)` scanner
/// tuples into dataset/block buckets, computing each file's dataset/block
/// hash along the way. Tuples with no resolved path are dropped. Mirrors
/// `ScanProviderBase._assign_dataset_block`.
pub fn assign(config: &HashKeyConfig, files: impl IntoIterator<Item = FileTuple>) -> Assignment {
    let mut out = Assignment::default();

    for (path, mut metadata, entries, locations, objects) in files {
        let Some(url) = path else { continue };
        let entries = entries.unwrap_or(-1);
        let hash_dataset = seeded_digest(&config.dataset_seed, &config.dataset_keys, &metadata);

        let location_seed = format!("{}{:?}", config.dataset_seed, locations);
        let hash_block = seeded_digest(&location_seed, &config.block_keys, &metadata);

        if !config.selected_dataset_hashes.is_empty()
            && !config.selected_dataset_hashes.contains(&hash_dataset)
        {
            continue;
        }
        if !config.selected_block_hashes.is_empty() && !config.selected_block_hashes.contains(&hash_block)
        {
            continue;
        }

        metadata.insert("DS_KEY".to_string(), hash_dataset.to_string());
        metadata.insert("BLOCK_KEY".to_string(), hash_block.to_string());

        let block_key = (hash_dataset, hash_block);
        out.dataset_metadata
            .entry(hash_dataset)
            .and_modify(|acc| intersect_first_dict(acc, &metadata))
            .or_insert_with(|| metadata.clone());
        out.block_metadata
            .entry(block_key)
            .and_modify(|acc| intersect_first_dict(acc, &metadata))
            .or_insert_with(|| metadata.clone());

        let mut record = FileRecord::new(url);
        record.entries = entries;
        record.metadata = metadata;
        record.locations = locations;
        record.objects = objects;
        out.files_by_block.entry(block_key).or_default().push(record);
    }

    out
}

/// Builds the final [`Block`] values from an [`Assignment`] plus the
/// dataset/block names resolved for each key. Mirrors `_build_blocks`:
/// locations are unioned in first-seen order, metadata key order follows the
/// first file's keys, and each block's declared `entries` is the sum when
/// every file's count is known.
pub fn build_blocks(
    assignment: Assignment,
    dataset_names: &BTreeMap<DatasetHash, String>,
    block_names: &BTreeMap<BlockKey, String>,
) -> Vec<Block> {
    let mut blocks = Vec::new();

    for (key, mut files) in assignment.files_by_block {
        files.sort_by(|a, b| a.url.cmp(&b.url));

        let mut locations: Option<BTreeSet<String>> = None;
        let mut seen_in_order: Vec<String> = Vec::new();
        for file in &files {
            if let Some(file_locations) = &file.locations {
                let bucket = locations.get_or_insert_with(BTreeSet::new);
                for loc in file_locations {
                    if bucket.insert(loc.clone()) {
                        seen_in_order.push(loc.clone());
                    }
                }
            }
        }

        let metadata_keys: Vec<String> = files
            .first()
            .map(|f| f.metadata.keys().cloned().collect())
            .unwrap_or_default();

        let mut block = Block {
            dataset: dataset_names.get(&key.0).cloned().unwrap_or_default(),
            block_name: block_names.get(&key).cloned().unwrap_or_default(),
            files,
            metadata_keys,
            locations,
            entries: 0,
        };
        block.recompute_entries();
        blocks.push(block);
    }

    blocks.sort_by(|a, b| a.identity().cmp(&b.identity()));
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn tuple(url: &str, metadata: BTreeMap<String, String>, entries: i64) -> FileTuple {
        (Some(url.to_string()), metadata, Some(entries), None, serde_json::Map::new())
    }

    #[test]
    fn two_files_with_identical_keys_fall_in_one_block() {
        let config = HashKeyConfig {
            dataset_seed: "ds".to_string(),
            dataset_keys: vec!["RUN".to_string()],
            block_keys: vec!["RUN".to_string()],
            selected_dataset_hashes: BTreeSet::new(),
            selected_block_hashes: BTreeSet::new(),
        };

        let files = vec![
            tuple("a.root", md(&[("RUN", "5")]), 10),
            tuple("b.root", md(&[("RUN", "5")]), 20),
            tuple("c.root", md(&[("RUN", "6")]), 30),
        ];

        let assignment = assign(&config, files);
        assert_eq!(assignment.files_by_block.len(), 2);
        let block_of_5 = assignment
            .files_by_block
            .values()
            .find(|files| files.len() == 2)
            .unwrap();
        assert_eq!(block_of_5.len(), 2);
    }

    #[test]
    fn dataset_selection_filters_out_other_hashes() {
        let base_config = HashKeyConfig {
            dataset_seed: "ds".to_string(),
            dataset_keys: vec!["RUN".to_string()],
            block_keys: vec![],
            selected_dataset_hashes: BTreeSet::new(),
            selected_block_hashes: BTreeSet::new(),
        };
        let files = vec![
            tuple("a.root", md(&[("RUN", "5")]), 10),
            tuple("b.root", md(&[("RUN", "6")]), 10),
        ];
        let unfiltered = assign(&base_config, files.clone());
        let wanted_hash = *unfiltered.dataset_metadata.keys().next().unwrap();

        let mut selected = BTreeSet::new();
        selected.insert(wanted_hash);
        let filtered_config = HashKeyConfig {
            selected_dataset_hashes: selected,
            ..base_config
        };
        let filtered = assign(&filtered_config, files);
        assert_eq!(filtered.dataset_metadata.len(), 1);
    }

    #[test]
    fn block_metadata_is_pruned_to_values_common_across_files() {
        let config = HashKeyConfig {
            dataset_seed: "ds".to_string(),
            dataset_keys: vec![],
            block_keys: vec![],
            selected_dataset_hashes: BTreeSet::new(),
            selected_block_hashes: BTreeSet::new(),
        };
        let files = vec![
            tuple("a.root", md(&[("RUN", "5"), ("UNIQUE", "x")]), 10),
            tuple("b.root", md(&[("RUN", "5"), ("UNIQUE", "y")]), 20),
        ];
        let assignment = assign(&config, files);
        let (_, metadata) = assignment.block_metadata.iter().next().unwrap();
        assert!(metadata.contains_key("RUN"));
        assert!(!metadata.contains_key("UNIQUE"));
    }
}
