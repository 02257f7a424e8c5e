use crate::base::ScanProviderBase;
use crate::error::ProviderError;
use gc_config::ConfigView;
use gc_hash::HashKeyConfig;
use gc_scanner::builtins::{
    AddFilePrefix, DetermineEvents, EventsSource, FilesFromDataProvider, FilesFromLs, MatchDelimiter,
    MatchOnFilename,
};
use gc_scanner::Scanner;
use gc_types::{seed_digest, FileTuple};
use std::collections::BTreeSet;

/// Builds a file list from a storage path, a glob, or a set of pre-fetched
/// tuples. Mirrors `ScanProvider` in the original: `source_directory` plus a
/// glob filter when the path's basename contains `*`, a bare directory scan
/// otherwise, or `FilesFromDataProvider` when the expression names a nested
/// dataset path (the original's `.dbs` suffix).
pub struct ScanProvider {
    base: ScanProviderBase,
}

impl ScanProvider {
    pub fn build(
        config: &ConfigView,
        dataset_expr: &str,
        dataset_nick: Option<&str>,
        prefetched: Option<Vec<FileTuple>>,
    ) -> Result<Self, ProviderError> {
        let basename = dataset_expr.rsplit('/').next().unwrap_or(dataset_expr);

        let first: Box<dyn Scanner> = if basename.contains('*') {
            let directory = dataset_expr.strip_suffix(basename).unwrap_or(dataset_expr);
            Box::new(FilesFromLs::new(directory))
        } else if !dataset_expr.ends_with(".dbs") {
            Box::new(FilesFromLs::new(dataset_expr))
        } else {
            Box::new(FilesFromDataProvider::new(prefetched.unwrap_or_default()))
        };

        let filename_filter = config.get_list("filename filter", vec!["*.root".to_string()]);
        let match_on_filename =
            MatchOnFilename::new(filename_filter).map_err(|e| ProviderError::AllScansFailed(e.to_string()))?;

        let delim = config.get("delimiter match", Some("")).unwrap_or_default();
        let mut delim_parts = delim.splitn(2, ':');
        let separator = delim_parts.next().and_then(|s| s.chars().next());
        let expected_count = delim_parts.next().and_then(|s| s.parse::<usize>().ok());
        let dataset_key = config.get("delimiter dataset key", Some("")).unwrap_or_default();
        let block_key = config.get("delimiter block key", Some("")).unwrap_or_default();

        let match_delimiter = MatchDelimiter::new(
            separator.unwrap_or('_'),
            expected_count,
            parse_range(&dataset_key),
            parse_range(&block_key),
        );

        let events_default = config.get_int("events default", Some(-1)).unwrap_or(-1);
        let determine_events = DetermineEvents::new(EventsSource::Default(events_default), false);

        let prefix = config.get("file prefix", Some("")).unwrap_or_default();
        let add_prefix = AddFilePrefix::new(prefix);

        let scanners: Vec<Box<dyn Scanner>> = vec![
            first,
            Box::new(match_on_filename),
            Box::new(match_delimiter),
            Box::new(determine_events),
            Box::new(add_prefix),
        ];

        let dataset_keys = config.get_list("dataset hash keys", vec![]);
        let block_keys = config.get_list("block hash keys", vec![]);
        let dataset_pattern = config.get("dataset name pattern", Some("")).unwrap_or_default();
        let block_pattern = config.get("block name pattern", Some("")).unwrap_or_default();
        let interactive = config.get_bool("dataset name assignment", Some(true)).unwrap_or(true);

        let hash_config = HashKeyConfig {
            dataset_seed: format!(
                "{}{}",
                seed_digest(dataset_expr),
                seed_digest(dataset_nick.unwrap_or(""))
            ),
            dataset_keys,
            block_keys,
            selected_dataset_hashes: BTreeSet::new(),
            selected_block_hashes: BTreeSet::new(),
        };

        Ok(ScanProvider {
            base: ScanProviderBase::new(scanners, hash_config, dataset_pattern, block_pattern, interactive),
        })
    }

    pub fn base(&self) -> &ScanProviderBase {
        &self.base
    }
}

/// Parses the original's `getVar = lambda (d, s, e)` slice selector,
/// `"start:end"` with optional empty ends, into a `(start, end)` pair.
fn parse_range(spec: &str) -> Option<(i32, i32)> {
    if spec.is_empty() {
        return None;
    }
    let mut parts = spec.splitn(2, ':');
    let start: i32 = parts.next()?.parse().ok()?;
    let end: i32 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(i32::MAX);
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_config::NonInteractiveSink;
    use gc_types::CancelToken;

    #[test]
    fn scans_a_plain_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.root"), b"").unwrap();

        let config = ConfigView::new("dataset");
        let provider = ScanProvider::build(&config, dir.path().to_str().unwrap(), None, None).unwrap();
        let blocks = provider
            .base()
            .iter_blocks_raw(&CancelToken::new(), &NonInteractiveSink)
            .unwrap();
        assert_eq!(blocks.len(), 1);
    }
}
