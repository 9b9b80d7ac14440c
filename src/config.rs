//! Entry sets and config descriptors.
//!
//! An [`EntrySet`] is the flat name → content mapping produced by one
//! generator for one board variant. A [`ConfigDescriptor`] pairs it with
//! the human-readable aliases it should be reachable under.

use std::collections::BTreeMap;

use crate::hash::{hash_strings, short_hash};

/// Flat mapping from artifact name (e.g. `seL4.settings.cmake`) to its
/// text content.
///
/// Backed by a `BTreeMap`, so iteration and hashing always run over the
/// sorted name order regardless of insertion order. Inserting an existing
/// name replaces its content (explicit re-specification overrides).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySet {
    entries: BTreeMap<String, String>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an artifact; last write for a given name wins.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.entries.insert(name.into(), content.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Iterate entries in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full content hash over the sorted (name, content) traversal.
    ///
    /// Order-independent by construction: two sets with identical
    /// mappings hash identically no matter how they were built.
    pub fn content_hash(&self) -> String {
        hash_strings(self.iter().flat_map(|(name, content)| [name, content]))
    }

    /// Truncated content hash used as the storage directory name.
    pub fn short_hash(&self) -> String {
        short_hash(&self.content_hash()).to_string()
    }
}

impl FromIterator<(String, String)> for EntrySet {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// One realizable configuration: an entry set plus its aliases.
///
/// Immutable once constructed; produced once per catalog entry.
#[derive(Debug, Clone)]
pub struct ConfigDescriptor {
    entries: EntrySet,
    aliases: Vec<String>,
}

impl ConfigDescriptor {
    pub fn new(entries: EntrySet, aliases: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            entries,
            aliases: aliases.into_iter().map(Into::into).collect(),
        }
    }

    pub fn entries(&self) -> &EntrySet {
        &self.entries
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_independent_of_insertion_order() {
        let mut a = EntrySet::new();
        a.insert("misc.json", "{}");
        a.insert("seL4.settings.cmake", "set(X Y CACHE STRING \"\")\n");

        let mut b = EntrySet::new();
        b.insert("seL4.settings.cmake", "set(X Y CACHE STRING \"\")\n");
        b.insert("misc.json", "{}");

        assert_eq!(a, b);
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn hash_is_sensitive_to_content_and_names() {
        let mut base = EntrySet::new();
        base.insert("misc.json", "{}");
        base.insert("simulate.sh", "exec qemu\n");

        let mut mutated = base.clone();
        mutated.insert("simulate.sh", "exec Qemu\n");
        assert_ne!(base.content_hash(), mutated.content_hash());

        let mut renamed = EntrySet::new();
        renamed.insert("misc.json", "{}");
        renamed.insert("simulate.bash", "exec qemu\n");
        assert_ne!(base.content_hash(), renamed.content_hash());

        let mut removed = EntrySet::new();
        removed.insert("misc.json", "{}");
        assert_ne!(base.content_hash(), removed.content_hash());
    }

    #[test]
    fn last_write_wins() {
        let mut set = EntrySet::new();
        set.insert("misc.json", "first");
        set.insert("misc.json", "second");
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("misc.json"), Some("second"));
    }

    #[test]
    fn short_hash_length() {
        let mut set = EntrySet::new();
        set.insert("a", "b");
        assert_eq!(set.short_hash().len(), crate::hash::SHORT_HASH_LENGTH);
    }
}
