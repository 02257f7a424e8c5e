use gc_types::{Partition, PartitionMap};
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("io error writing partition map: {0}")]
    Io(#[from] std::io::Error),
}

/// Strips the common directory prefix shared by every url in `urls`, the
/// way `DataSplitter.saveJobMapping` does, but only when it's longer than 6
/// bytes (a short prefix isn't worth the indirection).
fn common_prefix(urls: &[String]) -> Option<String> {
    let first = urls.first()?;
    let mut prefix = first.rsplit_once('/').map(|(dir, _)| dir.to_string())?;
    for url in &urls[1..] {
        while !url.starts_with(&format!("{prefix}/")) {
            match prefix.rsplit_once('/') {
                Some((shorter, _)) => prefix = shorter.to_string(),
                None => return None,
            }
        }
    }
    if prefix.len() > 6 {
        Some(prefix)
    } else {
        None
    }
}

fn encode_info(partition: &Partition, common_prefix: &Option<String>) -> String {
    let mut lines = vec![
        format!("Dataset = {}", partition.dataset),
        format!("BlockName = {}", partition.block_name),
        format!("Nickname = {}", partition.nickname.clone().unwrap_or_default()),
        format!("DatasetID = {}", partition.dataset_id),
        format!("NEntries = {}", partition.entries),
        format!("Skipped = {}", partition.skip),
        format!(
            "SEList = {}",
            partition
                .locations
                .clone()
                .unwrap_or_default()
                .into_iter()
                .collect::<Vec<_>>()
                .join(",")
        ),
    ];
    if let Some(prefix) = common_prefix {
        lines.push(format!("CommonPrefix = {prefix}"));
    }
    lines.join("\n")
}

fn encode_list(partition: &Partition, common_prefix: &Option<String>) -> String {
    let names: Vec<&str> = partition
        .urls
        .iter()
        .map(|url| match common_prefix {
            Some(prefix) => url.strip_prefix(&format!("{prefix}/")).unwrap_or(url),
            None => url.as_str(),
        })
        .collect();
    names.join("\n")
}

fn write_job_entry(
    tar: &mut tar::Builder<impl Write>,
    job_num: usize,
    slot: Option<&Partition>,
) -> Result<(), ArchiveError> {
    let (info, list) = match slot {
        Some(partition) => {
            let prefix = common_prefix(&partition.urls);
            (encode_info(partition, &prefix), encode_list(partition, &prefix))
        }
        None => ("Retired = true".to_string(), String::new()),
    };

    for (name, data) in [("info", info), ("list", list)] {
        let path = format!("{job_num:05}/{name}");
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        tar.append_data(&mut header, &path, data.as_bytes())?;
    }
    Ok(())
}

fn flush_group(
    outer: &mut tar::Builder<std::fs::File>,
    group: usize,
    entries: &[(usize, Option<Partition>)],
) -> Result<(), ArchiveError> {
    if entries.is_empty() {
        return Ok(());
    }
    let mut gz_buf = Vec::new();
    {
        let encoder = flate2::write::GzEncoder::new(&mut gz_buf, flate2::Compression::default());
        let mut sub = tar::Builder::new(encoder);
        for (job_num, slot) in entries {
            write_job_entry(&mut sub, *job_num, slot.as_ref())?;
        }
        sub.into_inner()?.finish()?;
    }
    let name = format!("{group:03}XX.tgz");
    let mut header = tar::Header::new_gnu();
    header.set_size(gz_buf.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    outer.append_data(&mut header, &name, gz_buf.as_slice())?;
    Ok(())
}

/// Writes `partitions` to `<dir>/datamap.tar`: an outer tar holding a plain
/// `Metadata` entry (`ClassName`, `MaxJobs`) and one gzip'd `NNNXX.tgz`
/// sub-archive per 100 partitions, each containing `%05d/info` +
/// `%05d/list` per job. Written to a temp file and renamed into place so a
/// reader never observes a partial archive.
pub fn write_partition_map(dir: &Path, partitions: &PartitionMap, class_name: &str) -> Result<(), ArchiveError> {
    let final_path = dir.join("datamap.tar");
    let tmp_path = dir.join("datamap.tar.tmp");

    {
        let file = std::fs::File::create(&tmp_path)?;
        let mut outer = tar::Builder::new(file);

        let metadata = format!("ClassName = {class_name}\nMaxJobs = {}", partitions.len());
        let mut header = tar::Header::new_gnu();
        header.set_size(metadata.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        outer.append_data(&mut header, "Metadata", metadata.as_bytes())?;

        let mut group: usize = 0;
        let mut group_entries: Vec<(usize, Option<Partition>)> = Vec::new();

        for (job_num, slot) in partitions.iter_all() {
            let this_group = job_num / 100;
            if this_group != group && !group_entries.is_empty() {
                flush_group(&mut outer, group, &group_entries)?;
                group_entries.clear();
            }
            group = this_group;
            group_entries.push((job_num, slot.cloned()));
        }
        flush_group(&mut outer, group, &group_entries)?;

        outer.into_inner()?.sync_all()?;
    }

    std::fs::rename(&tmp_path, &final_path)?;
    Ok(())
}

pub fn parse_locations(raw: &str) -> Option<BTreeSet<String>> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.split(',').map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_prefix_only_applies_above_six_bytes() {
        let urls = vec!["/a/b".to_string(), "/a/c".to_string()];
        assert_eq!(common_prefix(&urls), None);

        let urls = vec!["/store/long/path/a.root".to_string(), "/store/long/path/b.root".to_string()];
        assert_eq!(common_prefix(&urls), Some("/store/long/path".to_string()));
    }

    #[test]
    fn writes_an_archive_without_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut map = PartitionMap::new();
        map.append(Partition {
            dataset: "/PRIVATE/ds".to_string(),
            block_name: "blk".to_string(),
            nickname: None,
            dataset_id: 0,
            urls: vec!["/store/a.root".to_string()],
            entries: 10,
            skip: 0,
            locations: None,
            common_prefix: None,
        });
        write_partition_map(dir.path(), &map, "FileBoundarySplitter").unwrap();
        assert!(dir.path().join("datamap.tar").exists());
    }
}
