use gc_types::{Partition, PartitionMap};
use std::collections::BTreeMap;

/// Per-file contributed event counts within a partition: the first file
/// contributes `its entries - skip`, the last (if different) contributes
/// whatever remains of the declared `entries` total, and every file in
/// between contributes its full count. Only the first and last files of a
/// partition can ever be partial, matching how the Splitter builds them.
fn contributions(partition: &Partition, entries_of: &BTreeMap<String, i64>) -> Vec<i64> {
    let n = partition.urls.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![partition.entries];
    }

    let first_full = entries_of.get(&partition.urls[0]).copied().unwrap_or(0);
    let first_contrib = first_full - partition.skip;

    let middle_sum: i64 = partition.urls[1..n - 1]
        .iter()
        .map(|url| entries_of.get(url).copied().unwrap_or(0))
        .sum();

    let last_contrib = partition.entries - first_contrib - middle_sum;

    let mut out = Vec::with_capacity(n);
    out.push(first_contrib);
    out.extend(
        partition.urls[1..n - 1]
            .iter()
            .map(|url| entries_of.get(url).copied().unwrap_or(0)),
    );
    out.push(last_contrib);
    out
}

/// Removes `url` from `partition` (it disappeared, or the operator elected
/// to treat a shrunk file as missing), recomputing `entries`/`skip` from
/// the remaining files' contributions. Returns `true` if the partition is
/// now empty and should be retired.
pub fn remove_file(partition: &mut Partition, url: &str, entries_of: &BTreeMap<String, i64>) -> bool {
    let Some(idx) = partition.urls.iter().position(|u| u == url) else {
        return partition.urls.is_empty();
    };

    let contribs = contributions(partition, entries_of);
    partition.urls.remove(idx);

    if partition.urls.is_empty() {
        partition.entries = 0;
        partition.skip = 0;
        return true;
    }

    let removed_contrib = contribs[idx];
    partition.entries -= removed_contrib;
    if idx == 0 {
        partition.skip = 0;
    }
    false
}

/// Applies a block's worth of missing-file removals against every
/// partition of `map`, retiring any partition whose file list becomes
/// empty. `entries_of` supplies each removed url's prior (old) entry count.
pub fn remove_missing_files(map: &mut PartitionMap, urls: &[String], entries_of: &BTreeMap<String, i64>) {
    let numbers: Vec<usize> = map.iter().map(|(n, _)| n).collect();
    for number in numbers {
        let mut retire = false;
        if let Some(partition) = map.get(number) {
            let mut partition = partition.clone();
            let mut touched = false;
            for url in urls {
                if partition.urls.contains(url) {
                    touched = true;
                    if remove_file(&mut partition, url, entries_of) {
                        retire = true;
                    }
                }
            }
            if touched {
                if retire {
                    map.retire(number);
                } else {
                    map.set(number, Some(partition));
                }
            }
        }
    }
}

/// Retires every partition belonging to `(dataset, block_name)` — used
/// when an entire block disappears.
pub fn retire_block(map: &mut PartitionMap, dataset: &str, block_name: &str) {
    let numbers: Vec<usize> = map
        .iter()
        .filter(|(_, p)| p.dataset == dataset && p.block_name == block_name)
        .map(|(n, _)| n)
        .collect();
    for number in numbers {
        map.retire(number);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partition(urls: Vec<&str>, entries: i64, skip: i64) -> Partition {
        Partition {
            dataset: "ds".into(),
            block_name: "blk".into(),
            nickname: None,
            dataset_id: 0,
            urls: urls.into_iter().map(String::from).collect(),
            entries,
            skip,
            locations: None,
            common_prefix: None,
        }
    }

    #[test]
    fn scenario_4_missing_last_file_shrinks_the_partition() {
        let mut p = partition(vec!["x.root", "y.root"], 30, 0);
        let entries_of = BTreeMap::from([("x.root".to_string(), 10), ("y.root".to_string(), 20)]);
        let retired = remove_file(&mut p, "y.root", &entries_of);
        assert!(!retired);
        assert_eq!(p.urls, vec!["x.root"]);
        assert_eq!(p.entries, 10);
    }

    #[test]
    fn scenario_4_removing_the_only_remaining_file_retires_it() {
        let mut p = partition(vec!["x.root"], 10, 0);
        let entries_of = BTreeMap::from([("x.root".to_string(), 10)]);
        let retired = remove_file(&mut p, "x.root", &entries_of);
        assert!(retired);
        assert!(p.urls.is_empty());
    }

    #[test]
    fn removing_the_first_file_of_many_resets_skip() {
        let mut p = partition(vec!["x.root", "y.root"], 16, 4);
        let entries_of = BTreeMap::from([("x.root".to_string(), 10), ("y.root".to_string(), 10)]);
        remove_file(&mut p, "x.root", &entries_of);
        assert_eq!(p.urls, vec!["y.root"]);
        assert_eq!(p.skip, 0);
        assert_eq!(p.entries, 10);
    }

    #[test]
    fn retire_block_tombstones_every_matching_partition() {
        let mut map = PartitionMap::new();
        map.append(partition(vec!["x.root"], 10, 0));
        map.append(Partition {
            dataset: "other".into(),
            ..partition(vec!["y.root"], 5, 0)
        });
        retire_block(&mut map, "ds", "blk");
        assert_eq!(map.get(0), None);
        assert!(map.get(1).is_some());
    }
}
