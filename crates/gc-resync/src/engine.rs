use crate::apply::{remove_missing_files, retire_block};
use crate::diff::{diff_blocks, ResyncDelta};
use crate::error::ResyncError;
use gc_config::{PromptKind, PromptSink};
use gc_splitter::Splitter;
use gc_types::{Block, CancelToken, PartitionMap};
use std::collections::BTreeMap;

type BlockId = (String, String);

/// The classification log produced alongside the updated partition map:
/// which blocks were added, vanished, or changed, and which operator
/// choices were exercised.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ResyncReport {
    pub added_blocks: Vec<BlockId>,
    pub missing_blocks: Vec<BlockId>,
    pub changed_blocks: Vec<BlockId>,
    pub excluded_blocks: Vec<BlockId>,
    pub expanded_blocks: Vec<BlockId>,
    pub shrunk_as_missing: Vec<BlockId>,
}

/// Reconciles a prior [`PartitionMap`] against a refreshed view of the
/// data, per spec.md §4.5. Each of the four operator-confirmation classes
/// (shrunk, missing, expanded, added) is resolved through a [`PromptSink`];
/// a non-interactive sink (or `interactive = false`) defaults every class
/// to a conservative no-op.
///
/// Per Design Note §9's resolved Open Question, "exclude expanded
/// partitions from processing" and "submit the expanded tail as new
/// partitions" are mutually exclusive and prompted separately, in that
/// order: accepting the exclude option skips the submit prompt entirely
/// for that block.
pub struct ResyncEngine<'a> {
    splitter: Splitter,
    interactive: bool,
    sink: &'a dyn PromptSink,
}

impl<'a> ResyncEngine<'a> {
    pub fn new(splitter: Splitter, interactive: bool, sink: &'a dyn PromptSink) -> Self {
        ResyncEngine {
            splitter,
            interactive,
            sink,
        }
    }

    fn confirm(&self, kind: PromptKind, message: &str) -> bool {
        self.interactive && self.sink.confirm(kind, message)
    }

    /// Runs one resync pass: diffs `old_blocks` against `new_blocks`,
    /// applies the confirmed update rules against a clone of `old_map`, and
    /// returns the rewritten map plus a classification log. `old_map` is
    /// left untouched — on any error the caller still holds a valid prior
    /// map (spec.md §7's "prior map intact" guarantee).
    pub fn resync(
        &self,
        old_map: &PartitionMap,
        old_blocks: &[Block],
        new_blocks: &[Block],
        cancel: &CancelToken,
    ) -> Result<(PartitionMap, ResyncReport), ResyncError> {
        let deltas = diff_blocks(old_blocks, new_blocks);
        let mut map = old_map.clone();
        let mut report = ResyncReport::default();

        let new_by_id: BTreeMap<BlockId, &Block> = new_blocks
            .iter()
            .map(|b| ((b.dataset.clone(), b.block_name.clone()), b))
            .collect();
        let old_by_id: BTreeMap<BlockId, &Block> = old_blocks
            .iter()
            .map(|b| ((b.dataset.clone(), b.block_name.clone()), b))
            .collect();

        for (id, delta) in &deltas {
            cancel.check()?;
            self.apply_one(id, delta, &old_by_id, &new_by_id, &mut map, &mut report);
        }

        Ok((map, report))
    }

    fn apply_one(
        &self,
        id: &BlockId,
        delta: &ResyncDelta,
        old_by_id: &BTreeMap<BlockId, &Block>,
        new_by_id: &BTreeMap<BlockId, &Block>,
        map: &mut PartitionMap,
        report: &mut ResyncReport,
    ) {
        match delta {
            ResyncDelta::Added => {
                report.added_blocks.push(id.clone());
                if self.confirm(PromptKind::SubmitAddedBlocks, "submit newly discovered block?") {
                    if let Some(block) = new_by_id.get(id) {
                        for partition in self.splitter.split(block, 0) {
                            map.append(partition);
                        }
                    }
                }
            }
            ResyncDelta::Missing => {
                report.missing_blocks.push(id.clone());
                if self.confirm(
                    PromptKind::SubmitMissingRetirement,
                    "retire partitions of a vanished block?",
                ) {
                    retire_block(map, &id.0, &id.1);
                }
            }
            ResyncDelta::Changed {
                added_files: _,
                missing_files,
                expanded,
                shrunk,
            } => {
                report.changed_blocks.push(id.clone());
                let Some(old_block) = old_by_id.get(id) else { return };
                let entries_of: BTreeMap<String, i64> =
                    old_block.files.iter().map(|f| (f.url.clone(), f.entries)).collect();

                let mut to_remove: Vec<String> = Vec::new();
                if !missing_files.is_empty()
                    && self.confirm(
                        PromptKind::SubmitMissingRetirement,
                        "remove vanished files from the partitions referencing them?",
                    )
                {
                    to_remove.extend(missing_files.iter().cloned());
                }
                if !shrunk.is_empty()
                    && self.confirm(PromptKind::TreatShrunkAsMissing, "treat shrunk files as missing?")
                {
                    report.shrunk_as_missing.push(id.clone());
                    to_remove.extend(shrunk.iter().map(|d| d.url.clone()));
                }
                if !to_remove.is_empty() {
                    remove_missing_files(map, &to_remove, &entries_of);
                }

                if !expanded.is_empty() {
                    if self.confirm(
                        PromptKind::ExcludeExpandedFromProcessing,
                        "exclude expanded partitions from further execution?",
                    ) {
                        report.excluded_blocks.push(id.clone());
                    } else if self.confirm(
                        PromptKind::SubmitExpandedPartitions,
                        "submit the expanded tail as new partitions?",
                    ) {
                        report.expanded_blocks.push(id.clone());
                        if let Some(new_block) = new_by_id.get(id) {
                            for partition in self.splitter.split(new_block, old_block.entries.max(0)) {
                                map.append(partition);
                            }
                        }
                    }
                }
            }
        }
    }
}
