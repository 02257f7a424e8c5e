use gc_types::{BlockHash, DatasetHash};
use std::collections::BTreeMap;

/// Substitutes `@KEY@` placeholders in `pattern` with the matching metadata
/// value, mirroring the original's `replace_with_dict`.
pub fn replace_with_dict(pattern: &str, metadata: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(pattern.len());
    let bytes = pattern.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'@' {
            if let Some(end) = pattern[i + 1..].find('@') {
                let key = &pattern[i + 1..i + 1 + end];
                if let Some(value) = metadata.get(key) {
                    out.push_str(value);
                    i += end + 2;
                    continue;
                }
            }
        }
        let ch = pattern[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

/// Resolves a dataset's name: the configured pattern if set, else
/// `/PRIVATE/@SE_OUTPUT_BASE@` when that metadata key is present, else
/// `/PRIVATE/Dataset_<hash>`.
pub fn dataset_name(pattern: &str, metadata: &BTreeMap<String, String>, hash_dataset: &DatasetHash) -> String {
    let default = if metadata.contains_key("SE_OUTPUT_BASE") {
        "/PRIVATE/@SE_OUTPUT_BASE@".to_string()
    } else {
        format!("/PRIVATE/Dataset_{hash_dataset}")
    };
    let pattern = if pattern.is_empty() { default.as_str() } else { pattern };
    replace_with_dict(pattern, metadata)
}

/// Resolves a block's name: the configured pattern if set, else the first 8
/// hex characters of the block hash.
pub fn block_name(pattern: &str, metadata: &BTreeMap<String, String>, hash_block: &BlockHash) -> String {
    let default = hash_block.hex_prefix(8);
    let pattern = if pattern.is_empty() { default.as_str() } else { pattern };
    replace_with_dict(pattern, metadata)
}
