use std::collections::{BTreeMap, BTreeSet};

/// A single discovered file, as emitted by the end of the scanner chain.
///
/// `entries == -1` means the event count is unknown. `locations == None`
/// means "no constraint"; `Some(set)` where `set` is empty means "nowhere"
/// (the file exists but is not currently replicated anywhere usable).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FileRecord {
    pub url: String,
    pub entries: i64,
    pub metadata: BTreeMap<String, String>,
    pub locations: Option<BTreeSet<String>>,
    #[serde(default)]
    pub objects: serde_json::Map<String, serde_json::Value>,
}

impl FileRecord {
    pub fn new(url: impl Into<String>) -> Self {
        FileRecord {
            url: url.into(),
            entries: -1,
            metadata: BTreeMap::new(),
            locations: None,
            objects: serde_json::Map::new(),
        }
    }

    pub fn entries_known(&self) -> bool {
        self.entries >= 0
    }
}
