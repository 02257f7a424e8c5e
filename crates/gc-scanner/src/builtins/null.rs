use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;

/// Terminal identity scanner, always appended to a chain (spec.md §4.1).
pub struct NullScanner;

impl Scanner for NullScanner {
    fn name(&self) -> &'static str {
        "NullScanner"
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        Box::new(std::iter::once(Ok(tuple)))
    }
}
