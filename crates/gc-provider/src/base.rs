use crate::error::ProviderError;
use gc_config::PromptSink;
use gc_hash::HashKeyConfig;
use gc_scanner::{Chain, Scanner};
use gc_types::{Block, CancelToken};
use std::collections::{BTreeMap, BTreeSet};
use tracing::instrument;

/// Shared machinery behind `ScanProvider`/`GCProvider`: runs a scanner chain,
/// folds the result into named dataset/block groups, and reports name
/// collisions. Mirrors `ScanProviderBase` in the original.
pub struct ScanProviderBase {
    chain: Chain,
    hash_config: HashKeyConfig,
    dataset_pattern: String,
    block_pattern: String,
    interactive_assignment: bool,
}

impl ScanProviderBase {
    /// Builds a provider from its scanner chain and naming config. Any
    /// dataset/block hash key left unconfigured (empty) falls back to the
    /// union of the scanners' declared `guard_keys()`, matching how the
    /// original seeds `hash_input_set_{dataset,block}` from
    /// `scanner.get_guard_keysets()` when the operator didn't pick explicit
    /// keys.
    pub fn new(
        scanners: Vec<Box<dyn Scanner>>,
        mut hash_config: HashKeyConfig,
        dataset_pattern: String,
        block_pattern: String,
        interactive_assignment: bool,
    ) -> Self {
        if hash_config.dataset_keys.is_empty() && hash_config.block_keys.is_empty() {
            let mut ds = BTreeSet::new();
            let mut blk = BTreeSet::new();
            for scanner in &scanners {
                let (d, b) = scanner.guard_keys();
                ds.extend(d);
                blk.extend(b);
            }
            hash_config.dataset_keys = ds.into_iter().collect();
            hash_config.block_keys = blk.into_iter().collect();
        }

        ScanProviderBase {
            chain: Chain::new(scanners),
            hash_config,
            dataset_pattern,
            block_pattern,
            interactive_assignment,
        }
    }

    #[instrument(skip_all, name = "provider_scan")]
    pub fn iter_blocks_raw(
        &self,
        cancel: &CancelToken,
        sink: &dyn PromptSink,
    ) -> Result<Vec<Block>, ProviderError> {
        let outcome = self.chain.run(cancel)?;

        if outcome.tuples.is_empty() && !outcome.errors.is_empty() {
            return Err(ProviderError::AllScansFailed(
                outcome
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        }
        if outcome.tuples.is_empty() {
            return Err(ProviderError::NoData);
        }

        let assignment = gc_hash::assign(&self.hash_config, outcome.tuples);

        let mut dataset_names = BTreeMap::new();
        for (hash, metadata) in &assignment.dataset_metadata {
            dataset_names.insert(*hash, gc_hash::dataset_name(&self.dataset_pattern, metadata, hash));
        }
        let mut block_names = BTreeMap::new();
        for (key, metadata) in &assignment.block_metadata {
            block_names.insert(*key, gc_hash::block_name(&self.block_pattern, metadata, &key.1));
        }

        let report = gc_hash::check_names(&dataset_names, &block_names);
        gc_hash::confirm_or_abort(&report, self.interactive_assignment, sink)?;

        Ok(gc_hash::build_blocks(assignment, &dataset_names, &block_names))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_config::NonInteractiveSink;
    use gc_scanner::builtins::FilesFromLs;
    use gc_types::seed_digest;

    #[test]
    fn scans_a_directory_into_a_single_default_block() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.root"), b"").unwrap();
        std::fs::write(dir.path().join("b.root"), b"").unwrap();

        let provider = ScanProviderBase::new(
            vec![Box::new(FilesFromLs::new(dir.path()))],
            HashKeyConfig {
                dataset_seed: seed_digest("dataset-expr").to_string(),
                dataset_keys: vec![],
                block_keys: vec![],
                selected_dataset_hashes: Default::default(),
                selected_block_hashes: Default::default(),
            },
            String::new(),
            String::new(),
            false,
        );

        let blocks = provider
            .iter_blocks_raw(&CancelToken::new(), &NonInteractiveSink)
            .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].files.len(), 2);
    }

    #[test]
    fn empty_directory_yields_no_data_error() {
        let dir = tempfile::tempdir().unwrap();
        let provider = ScanProviderBase::new(
            vec![Box::new(FilesFromLs::new(dir.path()))],
            HashKeyConfig {
                dataset_seed: "seed".to_string(),
                dataset_keys: vec![],
                block_keys: vec![],
                selected_dataset_hashes: Default::default(),
                selected_block_hashes: Default::default(),
            },
            String::new(),
            String::new(),
            false,
        );

        let result = provider.iter_blocks_raw(&CancelToken::new(), &NonInteractiveSink);
        assert!(matches!(result, Err(ProviderError::NoData)));
    }
}
