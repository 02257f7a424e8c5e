use gc_config::{PromptKind, PromptSink};
use gc_types::{BlockHash, DatasetHash};
use std::collections::BTreeMap;

type BlockKey = (DatasetHash, BlockHash);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum NameCollisionError {
    #[error("operator declined to continue past a name collision")]
    Declined,
}

/// Finds cases where two distinct hash keys were assigned the same name
/// (`_check_map_name2key` in the original): two datasets sharing a name, or
/// two blocks (within the same dataset-name space) sharing a name.
pub struct CollisionReport {
    pub dataset_collisions: BTreeMap<String, Vec<DatasetHash>>,
    pub block_collisions: BTreeMap<String, Vec<BlockKey>>,
}

impl CollisionReport {
    pub fn has_collisions(&self) -> bool {
        !self.dataset_collisions.is_empty() || !self.block_collisions.is_empty()
    }
}

pub fn check_names(
    dataset_names: &BTreeMap<DatasetHash, String>,
    block_names: &BTreeMap<BlockKey, String>,
) -> CollisionReport {
    let mut by_dataset_name: BTreeMap<String, Vec<DatasetHash>> = BTreeMap::new();
    for (hash, name) in dataset_names {
        by_dataset_name.entry(name.clone()).or_default().push(*hash);
    }
    let dataset_collisions: BTreeMap<String, Vec<DatasetHash>> = by_dataset_name
        .into_iter()
        .filter(|(_, hashes)| hashes.len() > 1)
        .collect();

    let mut by_block_name: BTreeMap<String, Vec<BlockKey>> = BTreeMap::new();
    for (key, name) in block_names {
        by_block_name.entry(name.clone()).or_default().push(*key);
    }
    let block_collisions: BTreeMap<String, Vec<BlockKey>> = by_block_name
        .into_iter()
        .filter(|(_, keys)| keys.len() > 1)
        .collect();

    for (name, hashes) in &dataset_collisions {
        tracing::warn!(%name, count = hashes.len(), "multiple dataset keys mapped to the same name");
    }
    for (name, keys) in &block_collisions {
        tracing::warn!(%name, count = keys.len(), "multiple block keys mapped to the same name");
    }

    CollisionReport {
        dataset_collisions,
        block_collisions,
    }
}

/// When `interactive` and a collision was found, asks the sink for
/// confirmation to continue; a decline aborts the assignment.
pub fn confirm_or_abort(
    report: &CollisionReport,
    interactive: bool,
    sink: &dyn PromptSink,
) -> Result<(), NameCollisionError> {
    if !interactive || !report.has_collisions() {
        return Ok(());
    }
    if sink.confirm(PromptKind::NameCollisionContinue, "Do you want to continue?") {
        Ok(())
    } else {
        Err(NameCollisionError::Declined)
    }
}
