use gc_types::Partition;
use std::collections::BTreeMap;

/// Parses a `key = value` info block back into a `BTreeMap`, the inverse of
/// `gc_splitter`'s `encode_info`.
fn parse_kv(text: &str) -> BTreeMap<String, String> {
    text.lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

/// Decodes one job's `info` + `list` entries into a `Partition`, or `None`
/// if the slot is tombstoned (`Retired = true`).
pub fn decode_partition(info: &str, list: &str) -> Option<Partition> {
    let fields = parse_kv(info);
    if fields.get("Retired").map(String::as_str) == Some("true") {
        return None;
    }

    let common_prefix = fields.get("CommonPrefix").cloned();
    let urls: Vec<String> = list
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| match &common_prefix {
            Some(prefix) => format!("{prefix}/{line}"),
            None => line.to_string(),
        })
        .collect();

    let nickname = fields.get("Nickname").filter(|s| !s.is_empty()).cloned();
    let locations = fields
        .get("SEList")
        .map(String::as_str)
        .and_then(|raw| gc_splitter::parse_locations(raw));

    Some(Partition {
        dataset: fields.get("Dataset").cloned().unwrap_or_default(),
        block_name: fields.get("BlockName").cloned().unwrap_or_default(),
        nickname,
        dataset_id: fields.get("DatasetID").and_then(|v| v.parse().ok()).unwrap_or(0),
        urls,
        entries: fields.get("NEntries").and_then(|v| v.parse().ok()).unwrap_or(0),
        skip: fields.get("Skipped").and_then(|v| v.parse().ok()).unwrap_or(0),
        locations,
        common_prefix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_plain_partition() {
        let info = "Dataset = /PRIVATE/ds\nBlockName = blk\nNickname = \nDatasetID = 0\nNEntries = 10\nSkipped = 0\nSEList = s1,s2\n";
        let list = "/store/a.root\n/store/b.root";
        let partition = decode_partition(info, list).unwrap();
        assert_eq!(partition.dataset, "/PRIVATE/ds");
        assert_eq!(partition.urls, vec!["/store/a.root", "/store/b.root"]);
        assert_eq!(partition.entries, 10);
        assert!(partition.locations.is_some());
    }

    #[test]
    fn retired_slot_decodes_to_none() {
        assert!(decode_partition("Retired = true", "").is_none());
    }

    #[test]
    fn strips_a_common_prefix_from_listed_urls() {
        let info = "Dataset = ds\nBlockName = blk\nNickname = \nDatasetID = 0\nNEntries = 5\nSkipped = 0\nSEList = \nCommonPrefix = /store/long/path\n";
        let list = "a.root\nb.root";
        let partition = decode_partition(info, list).unwrap();
        assert_eq!(partition.urls, vec!["/store/long/path/a.root", "/store/long/path/b.root"]);
    }
}
