use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;
use std::path::PathBuf;

/// Parses a sibling `job.info` file (one `fileN = "hash  local  dest  se"`
/// line per output file) and emits a tuple per file, enriched with
/// `SE_OUTPUT_HASH_MD5`, `SE_OUTPUT_FILE`, `SE_OUTPUT_BASE`, and
/// `SE_OUTPUT_PATH`.
pub struct FilesFromJobInfo;

impl FilesFromJobInfo {
    pub fn new() -> Self {
        FilesFromJobInfo
    }
}

impl Default for FilesFromJobInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for FilesFromJobInfo {
    fn name(&self) -> &'static str {
        "FilesFromJobInfo"
    }

    fn guard_keys(&self) -> (Vec<String>, Vec<String>) {
        (vec!["SE_OUTPUT_FILE".to_string()], vec!["SE_OUTPUT_PATH".to_string()])
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        let (path, metadata, entries, locations, objects) = tuple;
        let Some(path) = path else {
            return Box::new(std::iter::empty());
        };

        let info_path = PathBuf::from(&path).join("job.info");
        let contents = match std::fs::read_to_string(&info_path) {
            Ok(c) => c,
            Err(source) => {
                return Box::new(std::iter::once(Err(ScannerError::Io {
                    scanner: self.name(),
                    path: info_path.display().to_string(),
                    source,
                })))
            }
        };

        let mut out = Vec::new();
        for line in contents.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            if !key.trim().starts_with("file") {
                continue;
            }
            let value = value.trim().trim_matches('"');
            let fields: Vec<&str> = value.split("  ").filter(|s| !s.is_empty()).collect();
            let [hash_md5, name_local, name_dest, path_se] = fields[..] else {
                out.push(Err(ScannerError::Rejected {
                    scanner: self.name(),
                    message: format!("malformed job.info line: {line:?}"),
                }));
                continue;
            };

            let mut md = metadata.clone();
            md.insert("SE_OUTPUT_HASH_MD5".to_string(), hash_md5.to_string());
            md.insert("SE_OUTPUT_FILE".to_string(), name_local.to_string());
            let base = std::path::Path::new(name_local)
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name_local.to_string());
            md.insert("SE_OUTPUT_BASE".to_string(), base);
            md.insert("SE_OUTPUT_PATH".to_string(), path_se.to_string());

            let url = PathBuf::from(path_se).join(name_dest).display().to_string();
            out.push(Ok((Some(url), md, entries, locations.clone(), objects.clone())));
        }

        Box::new(out.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gc_types::seed_tuple;

    #[test]
    fn parses_job_info_lines_into_enriched_tuples() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("job.info"),
            "file0 = \"abc123  out.root  out.root  /store/se\"\n",
        )
        .unwrap();

        let scanner = FilesFromJobInfo::new();
        let mut tuple = seed_tuple();
        tuple.0 = Some(dir.path().display().to_string());

        let results: Vec<_> = scanner.iter(0, tuple).collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(results.len(), 1);
        let (url, md, ..) = &results[0];
        assert_eq!(url.as_deref(), Some("/store/se/out.root"));
        assert_eq!(md.get("SE_OUTPUT_BASE").unwrap(), "out");
        assert_eq!(md.get("SE_OUTPUT_HASH_MD5").unwrap(), "abc123");
    }
}
