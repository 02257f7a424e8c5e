use crate::chain::Scanner;
use crate::error::ScannerError;
use gc_types::FileTuple;
use std::process::Command;

/// How a tuple's entry count is resolved when the scanner stage that
/// produced the file didn't already set it.
pub enum EventsSource {
    /// Read an existing metadata key and parse it as an integer.
    MetadataKey(String),
    /// Run an external command (receiving the file path as its sole
    /// argument) and parse its stdout as an integer.
    ExternalCommand(String),
    /// Use a fixed default when nothing else is available.
    Default(i64),
}

/// Resolves the `entries` slot of a tuple, optionally dropping tuples whose
/// resolved entry count is zero.
pub struct DetermineEvents {
    source: EventsSource,
    ignore_empty: bool,
}

impl DetermineEvents {
    pub fn new(source: EventsSource, ignore_empty: bool) -> Self {
        DetermineEvents { source, ignore_empty }
    }
}

impl Scanner for DetermineEvents {
    fn name(&self) -> &'static str {
        "DetermineEvents"
    }

    fn iter(
        &self,
        _level: usize,
        tuple: FileTuple,
    ) -> Box<dyn Iterator<Item = Result<FileTuple, ScannerError>> + '_> {
        let (path, metadata, entries, locations, objects) = tuple;

        if entries.is_some() {
            return Box::new(std::iter::once(Ok((path, metadata, entries, locations, objects))));
        }

        let resolved = match &self.source {
            EventsSource::MetadataKey(key) => match metadata.get(key) {
                Some(value) => match value.parse::<i64>() {
                    Ok(n) => n,
                    Err(_) => {
                        return Box::new(std::iter::once(Err(ScannerError::Rejected {
                            scanner: self.name(),
                            message: format!("metadata key {key:?} is not an integer: {value:?}"),
                        })))
                    }
                },
                None => {
                    return Box::new(std::iter::once(Err(ScannerError::Rejected {
                        scanner: self.name(),
                        message: format!("missing metadata key {key:?}"),
                    })))
                }
            },
            EventsSource::ExternalCommand(cmd) => {
                let Some(path) = path.as_deref() else {
                    return Box::new(std::iter::empty());
                };
                let output = match Command::new(cmd).arg(path).output() {
                    Ok(o) => o,
                    Err(source) => {
                        return Box::new(std::iter::once(Err(ScannerError::Rejected {
                            scanner: self.name(),
                            message: format!("failed to run {cmd:?}: {source}"),
                        })))
                    }
                };
                match String::from_utf8_lossy(&output.stdout).trim().parse::<i64>() {
                    Ok(n) => n,
                    Err(_) => {
                        return Box::new(std::iter::once(Err(ScannerError::Rejected {
                            scanner: self.name(),
                            message: format!("{cmd:?} did not print an integer event count"),
                        })))
                    }
                }
            }
            EventsSource::Default(n) => *n,
        };

        if resolved == 0 && self.ignore_empty {
            return Box::new(std::iter::empty());
        }

        Box::new(std::iter::once(Ok((
            path,
            metadata,
            Some(resolved),
            locations,
            objects,
        ))))
    }
}
