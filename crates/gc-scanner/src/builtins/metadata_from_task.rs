use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;
use std::collections::{BTreeMap, BTreeSet};

/// Injects variables from the owning task's environment into every tuple's
/// metadata, skipping anything named in `deny`.
pub struct MetadataFromTask {
    task_vars: BTreeMap<String, String>,
    deny: BTreeSet<String>,
}

impl MetadataFromTask {
    pub fn new(task_vars: BTreeMap<String, String>, deny: BTreeSet<String>) -> Self {
        MetadataFromTask { task_vars, deny }
    }
}

impl Scanner for MetadataFromTask {
    fn name(&self) -> &'static str {
        "MetadataFromTask"
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        let (path, mut metadata, entries, locations, objects) = tuple;
        for (key, value) in &self.task_vars {
            if self.deny.contains(key) {
                continue;
            }
            metadata.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Box::new(std::iter::once(Ok((path, metadata, entries, locations, objects))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_types::seed_tuple;

    #[test]
    fn injects_task_vars_except_denied() {
        let mut vars = BTreeMap::new();
        vars.insert("DATASETNICK".to_string(), "MyNick".to_string());
        vars.insert("SCRATCH_DIR".to_string(), "/tmp/x".to_string());
        let mut deny = BTreeSet::new();
        deny.insert("SCRATCH_DIR".to_string());

        let scanner = MetadataFromTask::new(vars, deny);
        let results: Vec<_> = scanner
            .iter(0, seed_tuple())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let (_, md, ..) = &results[0];
        assert_eq!(md.get("DATASETNICK").unwrap(), "MyNick");
        assert!(!md.contains_key("SCRATCH_DIR"));
    }

    #[test]
    fn does_not_overwrite_existing_metadata() {
        let mut vars = BTreeMap::new();
        vars.insert("DATASETNICK".to_string(), "FromTask".to_string());

        let scanner = MetadataFromTask::new(vars, BTreeSet::new());
        let mut tuple = seed_tuple();
        tuple.1.insert("DATASETNICK".to_string(), "FromScanner".to_string());

        let results: Vec<_> = scanner.iter(0, tuple).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(results[0].1.get("DATASETNICK").unwrap(), "FromScanner");
    }
}
