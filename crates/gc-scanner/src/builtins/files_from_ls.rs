use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;
use std::path::PathBuf;

/// Lists a directory, emitting one tuple per entry found directly under it.
///
/// Entries are sorted by filename for deterministic output (spec.md §4.2
/// requires the Provider's final sort, but a stable scanner order makes
/// runs reproducible before that point too).
pub struct FilesFromLs {
    directory: PathBuf,
}

impl FilesFromLs {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        FilesFromLs {
            directory: directory.into(),
        }
    }
}

impl Scanner for FilesFromLs {
    fn name(&self) -> &'static str {
        "FilesFromLS"
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        let (_, metadata, entries, locations, objects) = tuple;

        let mut names: Vec<String> = match std::fs::read_dir(&self.directory) {
            Ok(rd) => rd
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.path().is_file())
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(source) => {
                return Box::new(std::iter::once(Err(ScannerError::Io {
                    scanner: self.name(),
                    path: self.directory.display().to_string(),
                    source,
                })))
            }
        };
        names.sort();

        let directory = self.directory.clone();
        Box::new(names.into_iter().map(move |name| {
            let url = directory.join(&name).display().to_string();
            Ok((
                Some(url),
                metadata.clone(),
                entries,
                locations.clone(),
                objects.clone(),
            ))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_types::seed_tuple;

    #[test]
    fn emits_one_tuple_per_file_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.root"), b"").unwrap();
        std::fs::write(dir.path().join("a.root"), b"").unwrap();

        let scanner = FilesFromLs::new(dir.path());
        let results: Vec<_> = scanner
            .iter(0, seed_tuple())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].0.as_ref().unwrap().ends_with("a.root"));
        assert!(results[1].0.as_ref().unwrap().ends_with("b.root"));
    }
}
