use crate::error::StoreError;
use crate::format::decode_partition;
use gc_types::{Partition, PartitionMap};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

struct ShardLocation {
    position: u64,
    size: u64,
}

/// A random-access reader over a persisted `datamap.tar`.
///
/// Opening the store scans the outer (uncompressed) tar once to record each
/// `NNNXX.tgz` sub-archive's byte range, without decompressing it. A later
/// [`PartitionMapStore::get`] seeks straight to the owning shard and
/// decompresses only that shard — the random reads the spec calls for. The
/// store owns the path, not an open file handle or a borrow into one, so
/// `Partition` values it returns are plain owned data (the "arena"
/// resolution of the original's cyclic random-access reader, Design Note
/// §9): there is nothing here that can dangle.
pub struct PartitionMapStore {
    path: PathBuf,
    class_name: String,
    max_jobs: usize,
    shards: BTreeMap<usize, ShardLocation>,
}

fn parse_metadata(text: &str) -> Result<(String, usize), StoreError> {
    let fields: BTreeMap<&str, &str> = text
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
        .collect();

    let class_name = fields
        .get("ClassName")
        .ok_or(StoreError::MissingMetadataKey("ClassName"))?
        .to_string();
    let max_jobs_raw = fields
        .get("MaxJobs")
        .ok_or(StoreError::MissingMetadataKey("MaxJobs"))?;
    let max_jobs = max_jobs_raw
        .parse()
        .map_err(|_| StoreError::InvalidMetadataInt {
            key: "MaxJobs",
            value: max_jobs_raw.to_string(),
        })?;
    Ok((class_name, max_jobs))
}

impl PartitionMapStore {
    /// Scans `<dir>/datamap.tar`, indexing shard byte ranges without
    /// decompressing any of them.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let path = dir.join("datamap.tar");
        let file = File::open(&path)?;
        let mut archive = tar::Archive::new(file);

        let mut class_name = None;
        let mut max_jobs = None;
        let mut shards = BTreeMap::new();

        for entry in archive.entries()? {
            let mut entry = entry?;
            let entry_path = entry.path()?.to_string_lossy().into_owned();

            if entry_path == "Metadata" {
                let mut text = String::new();
                entry.read_to_string(&mut text)?;
                let (name, jobs) = parse_metadata(&text)?;
                class_name = Some(name);
                max_jobs = Some(jobs);
            } else if let Some(group) = entry_path
                .strip_suffix("XX.tgz")
                .and_then(|prefix| prefix.parse::<usize>().ok())
            {
                let position = entry.raw_file_position();
                let size = entry.header().size()?;
                shards.insert(group, ShardLocation { position, size });
            }
        }

        Ok(PartitionMapStore {
            path,
            class_name: class_name.ok_or(StoreError::MissingMetadata)?,
            max_jobs: max_jobs.ok_or(StoreError::MissingMetadata)?,
            shards,
        })
    }

    pub fn len(&self) -> usize {
        self.max_jobs
    }

    pub fn is_empty(&self) -> bool {
        self.max_jobs == 0
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    fn read_shard(&self, group: usize) -> Result<Vec<u8>, StoreError> {
        let location = self
            .shards
            .get(&group)
            .ok_or_else(|| StoreError::MissingShard(format!("{group:03}XX.tgz")))?;

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(location.position))?;
        let mut compressed = vec![0u8; location.size as usize];
        file.read_exact(&mut compressed)?;

        let mut decoder = flate2::read::GzDecoder::new(Cursor::new(compressed));
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(decompressed)
    }

    fn decode_shard(&self, group: usize) -> Result<BTreeMap<usize, Option<Partition>>, StoreError> {
        let raw = self.read_shard(group)?;
        let mut archive = tar::Archive::new(Cursor::new(raw));
        let mut info: BTreeMap<usize, String> = BTreeMap::new();
        let mut list: BTreeMap<usize, String> = BTreeMap::new();

        for entry in archive.entries()? {
            let mut entry = entry?;
            let entry_path = entry.path()?.to_string_lossy().into_owned();
            let Some((job, kind)) = entry_path.split_once('/') else {
                continue;
            };
            let Ok(job_num) = job.parse::<usize>() else {
                continue;
            };
            let mut text = String::new();
            entry.read_to_string(&mut text)?;
            match kind {
                "info" => {
                    info.insert(job_num, text);
                }
                "list" => {
                    list.insert(job_num, text);
                }
                _ => {}
            }
        }

        Ok(info
            .into_iter()
            .map(|(job_num, info_text)| {
                let list_text = list.get(&job_num).cloned().unwrap_or_default();
                (job_num, decode_partition(&info_text, &list_text))
            })
            .collect())
    }

    /// Reads a single partition by number, decompressing only the shard
    /// that owns it. `Ok(None)` means either the slot is tombstoned or
    /// `number` is beyond every recorded shard.
    pub fn get(&self, number: usize) -> Result<Option<Partition>, StoreError> {
        if number >= self.max_jobs {
            return Err(StoreError::OutOfRange(number, self.max_jobs));
        }
        let group = number / 100;
        if !self.shards.contains_key(&group) {
            return Ok(None);
        }
        let decoded = self.decode_shard(group)?;
        Ok(decoded.into_iter().find(|(n, _)| *n == number).and_then(|(_, p)| p))
    }

    /// Materializes the full map, decompressing every shard. Used by the
    /// Resync Engine to reconstruct the prior partition universe.
    pub fn load_all(&self) -> Result<PartitionMap, StoreError> {
        let mut map = PartitionMap::new();
        for &group in self.shards.keys() {
            for (number, partition) in self.decode_shard(group)? {
                map.set(number, partition);
            }
        }
        for number in 0..self.max_jobs {
            if number >= map.len() {
                map.set(number, None);
            }
        }
        Ok(map)
    }
}
