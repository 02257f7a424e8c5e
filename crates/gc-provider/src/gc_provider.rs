use crate::base::ScanProviderBase;
use crate::error::ProviderError;
use gc_config::ConfigView;
use gc_hash::HashKeyConfig;
use gc_scanner::builtins::{
    AddFilePrefix, DetermineEvents, EventsSource, FilesFromJobInfo, JobInfoFromOutputDir, MatchDelimiter,
    MatchOnFilename, MetadataFromTask, OutputDirsFromConfig, OutputDirsFromWork,
};
use gc_scanner::Scanner;
use gc_types::seed_digest;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Reads file lists straight out of another grid-control instance's work
/// directory. Mirrors `GCProvider`: when `dataset_expr` names a directory it
/// reads that run's `job_N` output dirs directly (`OutputDirsFromWork`),
/// otherwise it's a path to that run's own config file, read indirectly via
/// `OutputDirsFromConfig` + `MetadataFromTask`.
pub struct GCProvider {
    base: ScanProviderBase,
}

impl GCProvider {
    pub fn build(
        config: &ConfigView,
        dataset_expr: &str,
        dataset_nick: Option<&str>,
        task_vars: BTreeMap<String, String>,
    ) -> Result<Self, ProviderError> {
        let source_dir_scanner: Box<dyn Scanner> = if Path::new(dataset_expr).is_dir() {
            Box::new(OutputDirsFromWork::new(dataset_expr))
        } else {
            Box::new(OutputDirsFromConfig::new(dataset_expr))
        };

        let deny: BTreeSet<String> = config
            .get_list("task metadata deny", vec![])
            .into_iter()
            .collect();

        let mut scanners: Vec<Box<dyn Scanner>> = vec![source_dir_scanner];
        if !Path::new(dataset_expr).is_dir() {
            scanners.push(Box::new(MetadataFromTask::new(task_vars, deny)));
        }
        scanners.push(Box::new(JobInfoFromOutputDir));
        scanners.push(Box::new(FilesFromJobInfo::new()));

        let filename_filter = config.get_list("filename filter", vec!["*.root".to_string()]);
        scanners.push(Box::new(
            MatchOnFilename::new(filename_filter).map_err(|e| ProviderError::AllScansFailed(e.to_string()))?,
        ));

        scanners.push(Box::new(MatchDelimiter::new('_', None, None, None)));

        let events_default = config.get_int("events default", Some(-1)).unwrap_or(-1);
        scanners.push(Box::new(DetermineEvents::new(
            EventsSource::Default(events_default),
            false,
        )));

        let prefix = config.get("file prefix", Some("")).unwrap_or_default();
        scanners.push(Box::new(AddFilePrefix::new(prefix)));

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

        Ok(GCProvider {
            base: ScanProviderBase::new(scanners, hash_config, dataset_pattern, block_pattern, interactive),
        })
    }

    pub fn base(&self) -> &ScanProviderBase {
        &self.base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_config::NonInteractiveSink;
    use gc_types::CancelToken;

    #[test]
    fn reads_job_output_dirs_directly_when_dataset_expr_is_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let job_dir = dir.path().join("job_0");
        std::fs::create_dir(&job_dir).unwrap();
        std::fs::write(
            job_dir.join("job.info"),
            "file0 = \"abc123  out.root  out.root  /store/se\"\n",
        )
        .unwrap();

        let config = ConfigView::new("dataset");
        let provider =
            GCProvider::build(&config, dir.path().to_str().unwrap(), None, BTreeMap::new()).unwrap();
        let blocks = provider
            .base()
            .iter_blocks_raw(&CancelToken::new(), &NonInteractiveSink)
            .unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].files.len(), 1);
    }
}
