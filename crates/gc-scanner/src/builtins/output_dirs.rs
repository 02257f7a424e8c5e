use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;
use std::path::{Path, PathBuf};

/// Walks a task's work directory, emitting one tuple per `job_<N>` output
/// directory found directly under it.
pub struct OutputDirsFromWork {
    work_dir: PathBuf,
}

impl OutputDirsFromWork {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        OutputDirsFromWork {
            work_dir: work_dir.into(),
        }
    }
}

impl Scanner for OutputDirsFromWork {
    fn name(&self) -> &'static str {
        "OutputDirsFromWork"
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        let (_, metadata, entries, locations, objects) = tuple;

        let mut dirs: Vec<PathBuf> = match std::fs::read_dir(&self.work_dir) {
            Ok(rd) => rd
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.is_dir()
                        && path
                            .file_name()
                            .and_then(|n| n.to_str())
                            .map(|n| n.starts_with("job_"))
                            .unwrap_or(false)
                })
                .collect(),
            Err(source) => {
                return Box::new(std::iter::once(Err(ScannerError::Io {
                    scanner: self.name(),
                    path: self.work_dir.display().to_string(),
                    source,
                })))
            }
        };
        dirs.sort();

        Box::new(dirs.into_iter().map(move |dir| {
            Ok((
                Some(dir.display().to_string()),
                metadata.clone(),
                entries,
                locations.clone(),
                objects.clone(),
            ))
        }))
    }
}

/// Reads `workdir = <path>` out of a simple `key = value` config file and
/// delegates to [`OutputDirsFromWork`] with the resolved directory.
pub struct OutputDirsFromConfig {
    config_path: PathBuf,
}

impl OutputDirsFromConfig {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        OutputDirsFromConfig {
            config_path: config_path.into(),
        }
    }

    fn resolve_work_dir(&self) -> Result<PathBuf, ScannerError> {
        let contents = std::fs::read_to_string(&self.config_path).map_err(|source| ScannerError::Io {
            scanner: "OutputDirsFromConfig",
            path: self.config_path.display().to_string(),
            source,
        })?;

        for line in contents.lines() {
            let line = line.trim();
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if key.trim() == "workdir" {
                let value = value.trim();
                let config_dir = self.config_path.parent().unwrap_or_else(|| Path::new("."));
                return Ok(config_dir.join(value));
            }
        }

        Err(ScannerError::Rejected {
            scanner: "OutputDirsFromConfig",
            message: format!("no 'workdir' key found in {}", self.config_path.display()),
        })
    }
}

impl Scanner for OutputDirsFromConfig {
    fn name(&self) -> &'static str {
        "OutputDirsFromConfig"
    }

    fn iter(
        &self,
        level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        match self.resolve_work_dir() {
            Ok(work_dir) => OutputDirsFromWork::new(work_dir).iter(level, tuple),
            Err(err) => Box::new(std::iter::once(Err(err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_types::seed_tuple;

    #[test]
    fn emits_one_tuple_per_job_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("job_0")).unwrap();
        std::fs::create_dir(dir.path().join("job_1")).unwrap();
        std::fs::create_dir(dir.path().join("other")).unwrap();

        let scanner = OutputDirsFromWork::new(dir.path());
        let results: Vec<_> = scanner
            .iter(0, seed_tuple())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn config_resolves_workdir_relative_to_itself() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("work")).unwrap();
        std::fs::create_dir(dir.path().join("work/job_0")).unwrap();
        let config_path = dir.path().join("gc.conf");
        std::fs::write(&config_path, "workdir = work\n").unwrap();

        let scanner = OutputDirsFromConfig::new(&config_path);
        let results: Vec<_> = scanner
            .iter(0, seed_tuple())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(results.len(), 1);
    }
}
