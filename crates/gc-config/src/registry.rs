use crate::error::ConfigError;
use std::collections::BTreeMap;

/// A static registry of named factories, replacing the original's dynamic
/// plugin/class loader (Design Note §9). Scanners, providers, splitters, and
/// matchers each register their factories here at startup; resolution is a
/// case-insensitive lookup with alias fallback, never a runtime import.
pub struct Registry<T> {
    kind: &'static str,
    factories: BTreeMap<String, T>,
    aliases: BTreeMap<String, String>,
}

impl<T> Registry<T> {
    pub fn new(kind: &'static str) -> Self {
        Registry {
            kind,
            factories: BTreeMap::new(),
            aliases: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &str, aliases: &[&str], factory: T) {
        let key = name.to_ascii_lowercase();
        for alias in aliases {
            self.aliases.insert(alias.to_ascii_lowercase(), key.clone());
        }
        self.factories.insert(key, factory);
    }

    pub fn resolve(&self, name: &str) -> Result<&T, ConfigError> {
        let key = name.to_ascii_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.factories
            .get(key)
            .ok_or_else(|| ConfigError::UnknownPlugin {
                kind: self.kind.to_string(),
                name: name.to_string(),
            })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
