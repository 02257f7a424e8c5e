use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;

/// Asserts the basename has an exact delimiter count and extracts
/// `DELIMITER_DS` / `DELIMITER_B` metadata from the delimited segments
/// selected by `dataset_range` / `block_range` (Python-slice-style `[start,
/// end)`, negative indices counted from the end).
pub struct MatchDelimiter {
    separator: char,
    expected_count: Option<usize>,
    dataset_range: Option<(i32, i32)>,
    block_range: Option<(i32, i32)>,
}

impl MatchDelimiter {
    pub fn new(
        separator: char,
        expected_count: Option<usize>,
        dataset_range: Option<(i32, i32)>,
        block_range: Option<(i32, i32)>,
    ) -> Self {
        MatchDelimiter {
            separator,
            expected_count,
            dataset_range,
            block_range,
        }
    }
}

fn py_slice<'a>(parts: &[&'a str], start: i32, end: i32) -> String {
    let len = parts.len() as i32;
    let norm = |i: i32| -> i32 {
        if i < 0 {
            (len + i).max(0)
        } else {
            i.min(len)
        }
    };
    let (s, e) = (norm(start), norm(end));
    if s >= e {
        return String::new();
    }
    parts[s as usize..e as usize].join("")
}

impl Scanner for MatchDelimiter {
    fn name(&self) -> &'static str {
        "MatchDelimiter"
    }

    fn guard_keys(&self) -> (Vec<String>, Vec<String>) {
        (
            if self.dataset_range.is_some() {
                vec!["DELIMITER_DS".to_string()]
            } else {
                Vec::new()
            },
            if self.block_range.is_some() {
                vec!["DELIMITER_B".to_string()]
            } else {
                Vec::new()
            },
        )
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        let (path, mut metadata, entries, locations, objects) = tuple;
        let Some(path) = path else {
            return Box::new(std::iter::empty());
        };
        let basename = path.rsplit('/').next().unwrap_or(&path).to_string();

        if let Some(expected) = self.expected_count {
            let actual = basename.matches(self.separator).count();
            if actual != expected {
                return Box::new(std::iter::empty());
            }
        }

        let parts: Vec<&str> = basename.split(self.separator).collect();
        if let Some((s, e)) = self.dataset_range {
            metadata.insert("DELIMITER_DS".to_string(), py_slice(&parts, s, e));
        }
        if let Some((s, e)) = self.block_range {
            metadata.insert("DELIMITER_B".to_string(), py_slice(&parts, s, e));
        }

        Box::new(std::iter::once(Ok((
            Some(path),
            metadata,
            entries,
            locations,
            objects,
        ))))
    }
}
