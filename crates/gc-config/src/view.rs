use crate::error::ConfigError;
use crate::time::parse_time;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

/// The scope of a configuration change: the set of tags it affects.
///
/// A `Resync(tags)` event is delivered to every `on_change` listener whose
/// own tag set intersects `tags`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResyncScope(pub BTreeSet<String>);

impl ResyncScope {
    pub fn new<I: IntoIterator<Item = S>, S: Into<String>>(tags: I) -> Self {
        ResyncScope(tags.into_iter().map(Into::into).collect())
    }

    pub fn intersects(&self, other: &BTreeSet<String>) -> bool {
        !self.0.is_disjoint(other)
    }
}

type Listener = (BTreeSet<String>, Box<dyn Fn(&ResyncScope) + Send + Sync>);

#[derive(Default)]
struct Inner {
    values: BTreeMap<(String, String), String>,
    listeners: BTreeMap<(String, String), Vec<Listener>>,
}

/// A hierarchical, keyed configuration view with typed accessors.
///
/// Multiple `ConfigView`s can share the same backing store (via
/// [`ConfigView::change_view`]), each with its own section search order and
/// default resync tag scope — the Rust analogue of the original's
/// `NamedObject` section-tag inheritance chain (own name, category, alias,
/// tried in order).
#[derive(Clone)]
pub struct ConfigView {
    inner: Arc<RwLock<Inner>>,
    /// Sections tried in order when resolving a bare key.
    sections: Vec<String>,
    /// Default resync scope attached to `on_change` registrations made
    /// through this view.
    tags: BTreeSet<String>,
}

impl ConfigView {
    pub fn new(root_section: impl Into<String>) -> Self {
        ConfigView {
            inner: Arc::new(RwLock::new(Inner::default())),
            sections: vec![root_section.into()],
            tags: BTreeSet::new(),
        }
    }

    /// Narrows this view: `set_sections` replaces the section search order
    /// (if non-empty), `add_names` appends additional sections tried after
    /// the current ones, and `set_tags` replaces the default resync scope.
    pub fn change_view(
        &self,
        set_sections: Option<Vec<String>>,
        add_names: Vec<String>,
        set_tags: Option<BTreeSet<String>>,
    ) -> ConfigView {
        let mut sections = set_sections.unwrap_or_else(|| self.sections.clone());
        sections.extend(add_names);

        ConfigView {
            inner: Arc::clone(&self.inner),
            sections,
            tags: set_tags.unwrap_or_else(|| self.tags.clone()),
        }
    }

    /// Sets a value directly under this view's first section, firing any
    /// `on_change` listener registered against that `(section, key)` whose
    /// tags intersect `scope`, iff the serialised value actually changed.
    pub fn set(&self, key: &str, value: impl Into<String>, scope: &ResyncScope) {
        let section = self.sections[0].clone();
        let value = value.into();
        let mut inner = self.inner.write().unwrap();

        let changed = inner.values.get(&(section.clone(), key.to_string())) != Some(&value);
        inner
            .values
            .insert((section.clone(), key.to_string()), value);

        if changed {
            if let Some(listeners) = inner.listeners.get(&(section, key.to_string())) {
                for (tags, callback) in listeners {
                    if scope.intersects(tags) {
                        callback(scope);
                    }
                }
            }
        }
    }

    fn resolve_raw(&self, key: &str) -> Option<String> {
        let inner = self.inner.read().unwrap();
        self.sections
            .iter()
            .find_map(|section| inner.values.get(&(section.clone(), key.to_string())).cloned())
    }

    /// Registers `callback` to fire whenever `key` changes under this view's
    /// primary section, scoped to this view's current tags.
    pub fn on_change(&self, key: &str, callback: impl Fn(&ResyncScope) + Send + Sync + 'static) {
        let section = self.sections[0].clone();
        let mut inner = self.inner.write().unwrap();
        inner
            .listeners
            .entry((section, key.to_string()))
            .or_default()
            .push((self.tags.clone(), Box::new(callback)));
    }

    pub fn get(&self, key: &str, default: Option<&str>) -> Result<String, ConfigError> {
        match self.resolve_raw(key) {
            Some(v) => Ok(v),
            None => default.map(str::to_string).ok_or_else(|| ConfigError::MissingRequired {
                section: self.sections[0].clone(),
                key: key.to_string(),
            }),
        }
    }

    pub fn get_int(&self, key: &str, default: Option<i64>) -> Result<i64, ConfigError> {
        match self.resolve_raw(key) {
            Some(v) => v.trim().parse().map_err(|_| ConfigError::InvalidInt {
                section: self.sections[0].clone(),
                key: key.to_string(),
                value: v,
            }),
            None => default.ok_or_else(|| ConfigError::MissingRequired {
                section: self.sections[0].clone(),
                key: key.to_string(),
            }),
        }
    }

    pub fn get_bool(&self, key: &str, default: Option<bool>) -> Result<bool, ConfigError> {
        match self.resolve_raw(key) {
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" | "on" => Ok(true),
                "false" | "no" | "0" | "off" => Ok(false),
                _ => Err(ConfigError::InvalidBool { value: v }),
            },
            None => default.ok_or_else(|| ConfigError::MissingRequired {
                section: self.sections[0].clone(),
                key: key.to_string(),
            }),
        }
    }

    /// `hh[:mm[:ss]] -> seconds`; empty or negative maps to `-1`.
    pub fn get_time(&self, key: &str, default: Option<i64>) -> Result<i64, ConfigError> {
        match self.resolve_raw(key) {
            Some(v) => parse_time(&v),
            None => default.ok_or_else(|| ConfigError::MissingRequired {
                section: self.sections[0].clone(),
                key: key.to_string(),
            }),
        }
    }

    /// Whitespace/newline separated list.
    pub fn get_list(&self, key: &str, default: Vec<String>) -> Vec<String> {
        match self.resolve_raw(key) {
            Some(v) => v.split_whitespace().map(str::to_string).collect(),
            None => default,
        }
    }

    /// `key = value` lines; the bare-word default entry (no `=`) is returned
    /// separately, matching the original `(dictionary, keys)` shape.
    pub fn get_dict(&self, key: &str) -> (BTreeMap<String, String>, Option<String>) {
        let mut map = BTreeMap::new();
        let mut default = None;
        if let Some(raw) = self.resolve_raw(key) {
            for line in raw.lines() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match line.split_once('=') {
                    Some((k, v)) => {
                        map.insert(k.trim().to_string(), v.trim().to_string());
                    }
                    None => default = Some(line.to_string()),
                }
            }
        }
        (map, default)
    }

    /// Resolves a path against `search_paths`, requiring existence unless
    /// `must_exist` is false.
    pub fn get_path(
        &self,
        key: &str,
        default: Option<&str>,
        search_paths: &[std::path::PathBuf],
        must_exist: bool,
    ) -> Result<std::path::PathBuf, ConfigError> {
        let raw = self.get(key, default)?;
        resolve_path(&raw, search_paths, must_exist)
    }

    pub fn get_paths(
        &self,
        key: &str,
        search_paths: &[std::path::PathBuf],
        must_exist: bool,
    ) -> Result<Vec<std::path::PathBuf>, ConfigError> {
        self.get_list(key, Vec::new())
            .iter()
            .map(|raw| resolve_path(raw, search_paths, must_exist))
            .collect()
    }

    /// Parses the value against a fixed set of choices (case-sensitive).
    pub fn get_choice(
        &self,
        key: &str,
        choices: &[&str],
        default: Option<&str>,
    ) -> Result<String, ConfigError> {
        let raw = self.get(key, default)?;
        if choices.contains(&raw.as_str()) {
            Ok(raw)
        } else {
            Err(ConfigError::InvalidChoice {
                value: raw,
                choices: choices.iter().map(|s| s.to_string()).collect(),
            })
        }
    }
}

fn resolve_path(
    raw: &str,
    search_paths: &[std::path::PathBuf],
    must_exist: bool,
) -> Result<std::path::PathBuf, ConfigError> {
    if raw.is_empty() {
        return Ok(std::path::PathBuf::new());
    }
    let direct = std::path::PathBuf::from(raw);
    if direct.exists() {
        return Ok(direct);
    }
    for base in search_paths {
        let candidate = base.join(raw);
        if candidate.exists() {
            return Ok(candidate);
        }
    }
    if must_exist {
        Err(ConfigError::PathNotFound {
            value: raw.to_string(),
        })
    } else {
        Ok(direct)
    }
}
