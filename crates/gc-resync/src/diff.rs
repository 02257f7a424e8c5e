use gc_types::{Block, FileRecord};
use std::collections::BTreeMap;

type BlockId = (String, String);

/// `ΔEntries = new.entries − old.entries` for one file present in both the
/// old and new view of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDelta {
    pub url: String,
    pub delta_entries: i64,
}

/// The classification of one `(dataset, blockName)` pair between an old and
/// a new pipeline pass. Unchanged block pairs (identical file lists and
/// entry counts) never appear here — per spec they're silently merged.
#[derive(Debug, Clone, PartialEq)]
pub enum ResyncDelta {
    /// The block exists only in the new view.
    Added,
    /// The block existed before but no longer appears.
    Missing,
    /// The block exists in both, but its file list or some file's entry
    /// count differs.
    Changed {
        added_files: Vec<FileRecord>,
        missing_files: Vec<String>,
        expanded: Vec<FileDelta>,
        shrunk: Vec<FileDelta>,
    },
}

fn index_by_id(blocks: &[Block]) -> BTreeMap<BlockId, &Block> {
    blocks
        .iter()
        .map(|b| ((b.dataset.clone(), b.block_name.clone()), b))
        .collect()
}

/// Three-way diffs `old` against `new` by `(dataset, blockName)`, per
/// spec.md §4.5: `Added = new − old`, `Missing = old − new`, `Changed =
/// pairs where the file list or any file.entries differ`.
pub fn diff_blocks(old: &[Block], new: &[Block]) -> BTreeMap<BlockId, ResyncDelta> {
    let old_index = index_by_id(old);
    let new_index = index_by_id(new);
    let mut out = BTreeMap::new();

    for (id, new_block) in &new_index {
        match old_index.get(id) {
            None => {
                out.insert(id.clone(), ResyncDelta::Added);
            }
            Some(old_block) => {
                if let Some(delta) = diff_files(old_block, new_block) {
                    out.insert(id.clone(), delta);
                }
            }
        }
    }
    for id in old_index.keys() {
        if !new_index.contains_key(id) {
            out.insert(id.clone(), ResyncDelta::Missing);
        }
    }

    out
}

fn diff_files(old: &Block, new: &Block) -> Option<ResyncDelta> {
    let old_files: BTreeMap<&str, &FileRecord> = old.files.iter().map(|f| (f.url.as_str(), f)).collect();
    let new_files: BTreeMap<&str, &FileRecord> = new.files.iter().map(|f| (f.url.as_str(), f)).collect();

    let mut added_files = Vec::new();
    let mut expanded = Vec::new();
    let mut shrunk = Vec::new();
    let mut any_metadata_change = false;

    for (url, new_file) in &new_files {
        match old_files.get(url) {
            None => added_files.push((*new_file).clone()),
            Some(old_file) => {
                let delta_entries = new_file.entries - old_file.entries;
                if delta_entries > 0 {
                    expanded.push(FileDelta {
                        url: url.to_string(),
                        delta_entries,
                    });
                } else if delta_entries < 0 {
                    shrunk.push(FileDelta {
                        url: url.to_string(),
                        delta_entries,
                    });
                } else if new_file.metadata != old_file.metadata {
                    any_metadata_change = true;
                }
            }
        }
    }

    let missing_files: Vec<String> = old_files
        .keys()
        .filter(|url| !new_files.contains_key(*url))
        .map(|url| url.to_string())
        .collect();

    if added_files.is_empty()
        && missing_files.is_empty()
        && expanded.is_empty()
        && shrunk.is_empty()
        && !any_metadata_change
    {
        return None;
    }

    Some(ResyncDelta::Changed {
        added_files,
        missing_files,
        expanded,
        shrunk,
    })
}
