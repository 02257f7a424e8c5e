use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;

/// Rewrites a tuple's url by prepending a configured prefix.
pub struct AddFilePrefix {
    prefix: String,
}

impl AddFilePrefix {
    pub fn new(prefix: impl Into<String>) -> Self {
        AddFilePrefix { prefix: prefix.into() }
    }
}

impl Scanner for AddFilePrefix {
    fn name(&self) -> &'static str {
        "AddFilePrefix"
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        let (path, metadata, entries, locations, objects) = tuple;
        let path = path.map(|p| format!("{}{}", self.prefix, p));
        Box::new(std::iter::once(Ok((path, metadata, entries, locations, objects))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_types::seed_tuple;

    #[test]
    fn prepends_the_prefix() {
        let scanner = AddFilePrefix::new("srm://se.example.org/");
        let mut tuple = seed_tuple();
        tuple.0 = Some("store/data.root".to_string());

        let results: Vec<_> = scanner.iter(0, tuple).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(
            results[0].0.as_deref(),
            Some("srm://se.example.org/store/data.root")
        );
    }
}
