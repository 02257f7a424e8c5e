//! Dataset and block content hashes.
//!
//! Mirrors the original `md5_hex(repr(seed) + repr(values))` scheme: a hash
//! is always seed-then-values, never the reverse, so that changing the seed
//! (e.g. the dataset expression) reliably changes every hash derived from it.

use std::collections::BTreeMap;
use std::fmt;

/// A 128-bit content hash identifying either a dataset or a block.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Digest(pub [u8; 16]);

impl Digest {
    pub fn from_md5(input: impl AsRef<[u8]>) -> Digest {
        Digest(md5::compute(input).0)
    }

    /// First `n` hex characters, used as the default block name.
    pub fn hex_prefix(&self, n: usize) -> String {
        let full = self.to_string();
        full[..n.min(full.len())].to_string()
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

/// Identifies the dataset a file belongs to.
pub type DatasetHash = Digest;
/// Identifies the block a file belongs to, within a dataset.
pub type BlockHash = Digest;

/// Builds the `repr(seed) + repr(values))` string the original hashed, using
/// a stable Rust encoding: `seed` verbatim, then each selected key's value
/// (or the literal `None`) in the caller-supplied key order.
pub fn seeded_digest(seed: &str, keys: &[String], metadata: &BTreeMap<String, String>) -> Digest {
    let mut repr = String::from(seed);
    for key in keys {
        repr.push('\u{1}');
        match metadata.get(key) {
            Some(value) => repr.push_str(value),
            None => repr.push_str("\u{0}None"),
        }
    }
    Digest::from_md5(repr.as_bytes())
}

/// Hash of an arbitrary value's debug-ish representation, used to seed
/// dataset/block hashes with the dataset expression, nickname override, or
/// location set.
pub fn seed_digest(value: &str) -> Digest {
    Digest::from_md5(value.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_formats_as_32_hex_chars() {
        let d = Digest::from_md5(b"hello");
        assert_eq!(d.to_string().len(), 32);
        assert_eq!(d.hex_prefix(8).len(), 8);
    }

    #[test]
    fn seeded_digest_is_stable_for_fixed_keys_and_values() {
        let mut md = BTreeMap::new();
        md.insert("a".to_string(), "1".to_string());
        md.insert("b".to_string(), "2".to_string());

        let keys = vec!["a".to_string(), "b".to_string()];
        let first = seeded_digest("seed", &keys, &md);
        let second = seeded_digest("seed", &keys, &md);
        assert_eq!(first, second);

        md.insert("b".to_string(), "3".to_string());
        let third = seeded_digest("seed", &keys, &md);
        assert_ne!(first, third);
    }

    #[test]
    fn seeded_digest_ignores_unlisted_keys() {
        let mut md = BTreeMap::new();
        md.insert("a".to_string(), "1".to_string());
        let keys = vec!["a".to_string()];
        let before = seeded_digest("seed", &keys, &md);

        md.insert("unrelated".to_string(), "xyz".to_string());
        let after = seeded_digest("seed", &keys, &md);
        assert_eq!(before, after);
    }
}
