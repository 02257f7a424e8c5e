use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;

/// Passes tuples through unchanged. Job-info enrichment itself lives in
/// [`crate::builtins::files_from_job_info::FilesFromJobInfo`]; this stage
/// exists so a chain can name the output-dir-to-job-info handoff explicitly
/// without duplicating that parsing logic.
pub struct JobInfoFromOutputDir;

impl Scanner for JobInfoFromOutputDir {
    fn name(&self) -> &'static str {
        "JobInfoFromOutputDir"
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        Box::new(std::iter::once(Ok(tuple)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_types::seed_tuple;

    #[test]
    fn passes_tuples_through_unchanged() {
        let scanner = JobInfoFromOutputDir;
        let mut tuple = seed_tuple();
        tuple.0 = Some("/work/job_3".to_string());
        let results: Vec<_> = scanner.iter(0, tuple).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(results[0].0.as_deref(), Some("/work/job_3"));
    }
}
