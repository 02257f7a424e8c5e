use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;

/// Emits tuples pre-fetched from a nested data provider.
///
/// The original scanner delegates live into another provider's query; here
/// the caller (`gc-provider`) resolves that nested query up front and hands
/// the resulting tuples in, so this crate doesn't need to depend on
/// `gc-provider` and create a dependency cycle.
pub struct FilesFromDataProvider {
    tuples: Vec<FileTuple>,
}

impl FilesFromDataProvider {
    pub fn new(tuples: Vec<FileTuple>) -> Self {
        FilesFromDataProvider { tuples }
    }
}

impl Scanner for FilesFromDataProvider {
    fn name(&self) -> &'static str {
        "FilesFromDataProvider"
    }

    fn iter(
        &self,
        _level: usize,
        _tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        Box::new(self.tuples.clone().into_iter().map(Ok))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_types::seed_tuple;

    #[test]
    fn emits_the_prefetched_tuples_regardless_of_input() {
        let mut t = seed_tuple();
        t.0 = Some("/nested/a.root".to_string());
        let scanner = FilesFromDataProvider::new(vec![t]);

        let results: Vec<_> = scanner
            .iter(0, seed_tuple())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.as_deref(), Some("/nested/a.root"));
    }
}
