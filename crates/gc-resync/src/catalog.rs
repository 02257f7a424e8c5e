use gc_types::{Block, FileRecord};
use std::collections::BTreeSet;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("malformed block header {0:?}, expected [dataset#block]")]
    BadHeader(String),
    #[error("malformed file line {0:?}, expected \"url = entries metadataJSON\"")]
    BadFileLine(String),
    #[error("invalid entries count in {0:?}")]
    BadEntries(String),
    #[error("invalid metadata JSON in {0:?}: {1}")]
    BadMetadata(String, serde_json::Error),
}

/// Encodes `blocks` into the same sidecar catalog format [`parse_dataset_list`]
/// reads back, sorted by block identity for a deterministic byte stream.
pub fn encode_dataset_list(blocks: &[Block]) -> String {
    let mut sorted: Vec<&Block> = blocks.iter().collect();
    sorted.sort_by(|a, b| a.identity().cmp(&b.identity()));

    let mut out = String::new();
    for block in sorted {
        out.push_str(&format!("[{}#{}]\n", block.dataset, block.block_name));
        if let Some(locations) = &block.locations {
            out.push_str(&format!("se list = {}\n", locations.iter().cloned().collect::<Vec<_>>().join(",")));
        }
        for file in &block.files {
            let metadata = serde_json::Value::Object(
                file.metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect(),
            );
            out.push_str(&format!("{} = {} {}\n", file.url, file.entries, metadata));
        }
    }
    out
}

/// Parses the sidecar `dataset.list` catalog the Resync Engine reads to
/// reconstruct `oldBlocks` (spec.md §6): per-block header lines
/// `[dataset#block]`, an optional `se list = s1,s2,...` line, followed by
/// one file per line `url = entries metadataJSON`.
pub fn parse_dataset_list(text: &str) -> Result<Vec<Block>, CatalogError> {
    let mut blocks = Vec::new();
    let mut current: Option<(String, String, Vec<FileRecord>, Option<BTreeSet<String>>)> = None;

    fn finish(current: Option<(String, String, Vec<FileRecord>, Option<BTreeSet<String>>)>, blocks: &mut Vec<Block>) {
        if let Some((dataset, block_name, files, locations)) = current {
            let metadata_keys = files
                .first()
                .map(|f| f.metadata.keys().cloned().collect())
                .unwrap_or_default();
            let mut block = Block {
                dataset,
                block_name,
                files,
                metadata_keys,
                locations,
                entries: 0,
            };
            block.recompute_entries();
            blocks.push(block);
        }
    }

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let (dataset, block_name) = header
                .split_once('#')
                .ok_or_else(|| CatalogError::BadHeader(line.to_string()))?;
            finish(current.take(), &mut blocks);
            current = Some((dataset.to_string(), block_name.to_string(), Vec::new(), None));
            continue;
        }

        let Some((dataset, _, files, locations)) = current.as_mut() else {
            return Err(CatalogError::BadFileLine(line.to_string()));
        };
        let _ = dataset;

        if let Some(rest) = line.strip_prefix("se list") {
            let rest = rest.trim_start_matches('=').trim();
            *locations = Some(rest.split(',').map(str::to_string).filter(|s| !s.is_empty()).collect());
            continue;
        }

        let (url, rest) = line
            .split_once('=')
            .ok_or_else(|| CatalogError::BadFileLine(line.to_string()))?;
        let url = url.trim().to_string();
        let rest = rest.trim();
        let (entries_raw, metadata_raw) = rest.split_once(char::is_whitespace).unwrap_or((rest, "{}"));

        let entries: i64 = entries_raw
            .trim()
            .parse()
            .map_err(|_| CatalogError::BadEntries(line.to_string()))?;
        let metadata_value: serde_json::Value = serde_json::from_str(metadata_raw.trim())
            .map_err(|e| CatalogError::BadMetadata(line.to_string(), e))?;
        let metadata = metadata_value
            .as_object()
            .map(|obj| {
                obj.iter()
                    .map(|(k, v)| (k.clone(), v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let mut file = FileRecord::new(url);
        file.entries = entries;
        file.metadata = metadata;
        files.push(file);
    }
    finish(current, &mut blocks);

    blocks.sort_by(|a, b| a.identity().cmp(&b.identity()));
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_block_with_locations() {
        let text = "[/PRIVATE/ds#blk]\nse list = s1,s2\n/store/a.root = 10 {\"RUN\":\"5\"}\n/store/b.root = 20 {\"RUN\":\"5\"}\n";
        let blocks = parse_dataset_list(text).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].dataset, "/PRIVATE/ds");
        assert_eq!(blocks[0].block_name, "blk");
        assert_eq!(blocks[0].files.len(), 2);
        assert_eq!(blocks[0].entries, 30);
        assert_eq!(
            blocks[0].locations,
            Some(BTreeSet::from(["s1".to_string(), "s2".to_string()]))
        );
    }

    #[test]
    fn parses_multiple_block_headers() {
        let text = "[ds#a]\n/x = 1 {}\n[ds#b]\n/y = 2 {}\n";
        let blocks = parse_dataset_list(text).unwrap();
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn rejects_a_file_line_before_any_header() {
        let text = "/x = 1 {}\n";
        assert!(matches!(parse_dataset_list(text), Err(CatalogError::BadFileLine(_))));
    }

    #[test]
    fn encode_then_parse_round_trips_a_block() {
        let mut file = FileRecord::new("/store/a.root");
        file.entries = 10;
        file.metadata.insert("RUN".to_string(), "5".to_string());
        let mut block = Block {
            dataset: "/PRIVATE/ds".to_string(),
            block_name: "blk".to_string(),
            files: vec![file],
            metadata_keys: vec!["RUN".to_string()],
            locations: Some(BTreeSet::from(["s1".to_string()])),
            entries: 0,
        };
        block.recompute_entries();

        let text = encode_dataset_list(&[block.clone()]);
        let parsed = parse_dataset_list(&text).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].dataset, block.dataset);
        assert_eq!(parsed[0].files[0].entries, 10);
        assert_eq!(parsed[0].locations, block.locations);
    }
}
