use gc_types::{Block, FileRecord, Partition};

/// The three ways a block's files are grouped into partitions. Mirrors the
/// `DataSplitter` subclasses of the original: one partition per file
/// boundary, a fixed number of files per partition, or a fixed number of
/// events per partition (which may split a single file across two adjacent
/// partitions via `skip`/`entries`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Splitter {
    FileBoundary,
    FixedFileCount(usize),
    FixedEventCount(i64),
}

impl Splitter {
    /// Splits `block` into partitions starting `first_skip` events into its
    /// first file (non-zero only when re-splitting the expanded remainder of
    /// a block during resync).
    pub fn split(&self, block: &Block, first_skip: i64) -> Vec<Partition> {
        match self {
            Splitter::FileBoundary => split_by_file(block, first_skip),
            Splitter::FixedFileCount(k) => split_by_file_count(block, *k, first_skip),
            Splitter::FixedEventCount(k) => split_by_event_count(block, *k, first_skip),
        }
    }
}

fn base_partition(block: &Block) -> Partition {
    Partition {
        dataset: block.dataset.clone(),
        block_name: block.block_name.clone(),
        nickname: None,
        dataset_id: 0,
        urls: Vec::new(),
        entries: 0,
        skip: 0,
        locations: block.locations.clone(),
        common_prefix: None,
    }
}

fn split_by_file(block: &Block, first_skip: i64) -> Vec<Partition> {
    let mut partitions = Vec::new();
    for (idx, file) in block.files.iter().enumerate() {
        let skip = if idx == 0 { first_skip } else { 0 };
        let mut partition = base_partition(block);
        partition.urls = vec![file.url.clone()];
        partition.entries = (file.entries.max(0) - skip).max(0);
        partition.skip = skip;
        partitions.push(partition);
    }
    partitions
}

fn split_by_file_count(block: &Block, count: usize, first_skip: i64) -> Vec<Partition> {
    let count = count.max(1);
    let mut partitions = Vec::new();
    for (chunk_idx, chunk) in block.files.chunks(count).enumerate() {
        let skip = if chunk_idx == 0 { first_skip } else { 0 };
        let mut partition = base_partition(block);
        partition.urls = chunk.iter().map(|f| f.url.clone()).collect();
        let total: i64 = chunk.iter().map(|f| f.entries.max(0)).sum();
        partition.entries = (total - skip).max(0);
        partition.skip = skip;
        partitions.push(partition);
    }
    partitions
}

/// Splits on a fixed event-count budget per partition, carrying a partial
/// file across the partition boundary via `skip` on the next partition that
/// resumes reading it.
fn split_by_event_count(block: &Block, budget: i64, first_skip: i64) -> Vec<Partition> {
    let budget = budget.max(1);
    let mut partitions = Vec::new();

    let mut cur_urls: Vec<String> = Vec::new();
    let mut cur_entries: i64 = 0;
    let mut cur_skip: i64 = 0;
    let mut file_offset: i64 = first_skip;

    let finish = |urls: &mut Vec<String>, entries: &mut i64, skip: i64, partitions: &mut Vec<Partition>| {
        if !urls.is_empty() {
            let mut partition = base_partition(block);
            partition.urls = std::mem::take(urls);
            partition.entries = *entries;
            partition.skip = skip;
            partitions.push(partition);
        }
        *entries = 0;
    };

    for file in &block.files {
        let mut remaining_in_file = file.entries.max(0) - file_offset;
        if remaining_in_file <= 0 {
            file_offset = 0;
            continue;
        }

        while remaining_in_file > 0 {
            if cur_urls.is_empty() {
                cur_skip = file_offset;
            }
            let need = budget - cur_entries;
            let take = need.min(remaining_in_file);

            if cur_urls.last().map(String::as_str) != Some(file.url.as_str()) {
                cur_urls.push(file.url.clone());
            }
            cur_entries += take;
            remaining_in_file -= take;
            file_offset += take;

            if cur_entries >= budget {
                finish(&mut cur_urls, &mut cur_entries, cur_skip, &mut partitions);
            }
        }
        file_offset = 0;
    }
    finish(&mut cur_urls, &mut cur_entries, cur_skip, &mut partitions);

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(url: &str, entries: i64) -> FileRecord {
        let mut f = FileRecord::new(url);
        f.entries = entries;
        f
    }

    fn block(files: Vec<FileRecord>) -> Block {
        Block {
            dataset: "/PRIVATE/ds".to_string(),
            block_name: "blk".to_string(),
            files,
            metadata_keys: vec![],
            locations: None,
            entries: 0,
        }
    }

    #[test]
    fn file_boundary_yields_one_partition_per_file() {
        let b = block(vec![file("a", 10), file("b", 20)]);
        let parts = Splitter::FileBoundary.split(&b, 0);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].entries, 10);
        assert_eq!(parts[1].entries, 20);
    }

    #[test]
    fn fixed_file_count_groups_files_into_chunks() {
        let b = block(vec![file("a", 10), file("b", 20), file("c", 5)]);
        let parts = Splitter::FixedFileCount(2).split(&b, 0);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].urls, vec!["a", "b"]);
        assert_eq!(parts[0].entries, 30);
        assert_eq!(parts[1].urls, vec!["c"]);
    }

    #[test]
    fn fixed_event_count_spans_a_file_across_two_partitions() {
        let b = block(vec![file("a", 15), file("b", 5)]);
        let parts = Splitter::FixedEventCount(10).split(&b, 0);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].urls, vec!["a"]);
        assert_eq!(parts[0].entries, 10);
        assert_eq!(parts[0].skip, 0);
        assert_eq!(parts[1].urls, vec!["a", "b"]);
        assert_eq!(parts[1].entries, 10);
        assert_eq!(parts[1].skip, 10);
    }

    #[test]
    fn first_skip_reduces_the_first_partitions_entries() {
        let b = block(vec![file("a", 10), file("b", 20)]);
        let parts = Splitter::FileBoundary.split(&b, 4);
        assert_eq!(parts[0].skip, 4);
        assert_eq!(parts[0].entries, 6);
        assert_eq!(parts[1].skip, 0);
    }
}
