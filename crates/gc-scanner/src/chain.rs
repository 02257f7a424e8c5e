use crate::error::ScannerError;
use gc_types::{seed_tuple, CancelToken, ErrorCollector, FileTuple};

/// A transformer over the 5-tuple stream `(path, metadata, entries,
/// locations, objects)`. Scanners compose into an ordered chain; each may
/// fan out (yield more than one tuple), filter (yield none), or annotate
/// (yield one tuple, modified).
///
/// `guard_keys` names metadata keys this scanner promises to populate, so
/// the Hash Grouper can fold them into the dataset/block hash inputs even
/// when the operator hasn't explicitly selected them.
pub trait Scanner: Send + Sync {
    fn name(&self) -> &'static str;

    fn guard_keys(&self) -> (Vec<String>, Vec<String>) {
        (Vec::new(), Vec::new())
    }

    fn iter(
        &self,
        level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_>;
}

/// An ordered scanner chain, terminated implicitly by a `NullScanner` per
/// spec.md §4.1 ("always appended").
pub struct Chain {
    scanners: Vec<Box<dyn Scanner>>,
}

pub struct ChainOutcome {
    pub tuples: Vec<FileTuple>,
    pub errors: Vec<ScannerError>,
}

impl Chain {
    pub fn new(mut scanners: Vec<Box<dyn Scanner>>) -> Self {
        scanners.push(Box::new(crate::builtins::null::NullScanner));
        Chain { scanners }
    }

    pub fn guard_keys(&self) -> (Vec<String>, Vec<String>) {
        let mut dataset_keys = Vec::new();
        let mut block_keys = Vec::new();
        for scanner in &self.scanners {
            let (ds, blk) = scanner.guard_keys();
            dataset_keys.extend(ds);
            block_keys.extend(blk);
        }
        (dataset_keys, block_keys)
    }

    /// Runs the chain to completion: `output_k = flat_map(output_{k-1},
    /// S_k.iter)`, starting from the seed tuple. The cancel check runs
    /// between every emitted tuple so a long pipeline can be cancelled
    /// promptly; a per-record scanner failure is collected and the run
    /// continues.
    pub fn run(&self, cancel: &CancelToken) -> Result<ChainOutcome, gc_types::AbortError> {
        let mut stage = vec![seed_tuple()];
        let mut collector: ErrorCollector<ScannerError> = ErrorCollector::new();

        for (level, scanner) in self.scanners.iter().enumerate() {
            let mut next = Vec::with_capacity(stage.len());
            for tuple in stage {
                cancel.check()?;
                collector.record_attempt();
                for result in scanner.iter(level, tuple) {
                    cancel.check()?;
                    match result {
                        Ok(t) => next.push(t),
                        Err(err) => {
                            tracing::warn!(scanner = scanner.name(), %err, "scanner record failed");
                            collector.record_error(err);
                        }
                    }
                }
            }
            stage = next;
        }

        Ok(ChainOutcome {
            tuples: stage,
            errors: collector.into_errors(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::null::NullScanner;

    #[test]
    fn empty_chain_yields_only_the_seed_tuple_through_null_scanner() {
        let chain = Chain::new(vec![Box::new(NullScanner)]);
        let outcome = chain.run(&CancelToken::new()).unwrap();
        assert_eq!(outcome.tuples.len(), 1);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn cancellation_is_observed_between_tuples() {
        let chain = Chain::new(vec![]);
        let cancel = CancelToken::new();
        cancel.cancel();
        assert!(chain.run(&cancel).is_err());
    }
}
