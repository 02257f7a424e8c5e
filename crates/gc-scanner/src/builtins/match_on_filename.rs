use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;

/// Drops tuples whose basename doesn't match any of the configured glob
/// patterns (default `*.root`).
pub struct MatchOnFilename {
    patterns: Vec<glob::Pattern>,
}

impl MatchOnFilename {
    pub fn new(patterns: Vec<String>) -> Result<Self, glob::PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MatchOnFilename { patterns })
    }
}

impl Scanner for MatchOnFilename {
    fn name(&self) -> &'static str {
        "MatchOnFilename"
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        let basename = tuple
            .0
            .as_deref()
            .and_then(|p| p.rsplit('/').next())
            .unwrap_or_default()
            .to_string();

        if self.patterns.is_empty() || self.patterns.iter().any(|p| p.matches(&basename)) {
            Box::new(std::iter::once(Ok(tuple)))
        } else {
            Box::new(std::iter::empty())
        }
    }
}
