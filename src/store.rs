//! Content-addressed config store.
//!
//! Layout under a generation output root:
//!
//! ```text
//! <root>/by-hash/<short-hash>/config/<entry-name>   canonical storage
//! <root>/by-alias/<alias>  ->  ../by-hash/<short-hash>
//! ```
//!
//! Aliases are relative symlinks, so the store stays valid when moved as
//! a whole. A generation pass always targets a fresh root; the store
//! never deduplicates, evicts, or garbage-collects.

use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use walkdir::WalkDir;

use crate::config::{ConfigDescriptor, EntrySet};

/// Directory of hash-keyed config directories.
pub const BY_HASH_DIR: &str = "by-hash";
/// Directory of alias symlinks.
pub const BY_ALIAS_DIR: &str = "by-alias";
/// Subdirectory holding the entry files within a hash directory.
pub const CONFIG_SUBDIR: &str = "config";

/// Store rooted at a generation output directory.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    root: PathBuf,
}

impl ConfigStore {
    /// Create a fresh store at `root`.
    ///
    /// Fails before writing anything if the root already contains store
    /// directories; a generation pass never runs over a populated root.
    pub fn create(root: &Path) -> Result<Self> {
        let by_hash = root.join(BY_HASH_DIR);
        let by_alias = root.join(BY_ALIAS_DIR);
        if by_hash.exists() || by_alias.exists() {
            bail!(
                "output root '{}' already contains a config store; generate into a fresh root",
                root.display()
            );
        }
        fs::create_dir_all(root)
            .with_context(|| format!("creating output root '{}'", root.display()))?;
        fs::create_dir(&by_hash)
            .with_context(|| format!("creating '{}'", by_hash.display()))?;
        fs::create_dir(&by_alias)
            .with_context(|| format!("creating '{}'", by_alias.display()))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Open an existing store for reading.
    pub fn open(root: &Path) -> Result<Self> {
        let by_hash = root.join(BY_HASH_DIR);
        if !by_hash.is_dir() {
            bail!("no config store at '{}' (missing {BY_HASH_DIR})", root.display());
        }
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn by_hash_dir(&self) -> PathBuf {
        self.root.join(BY_HASH_DIR)
    }

    fn by_alias_dir(&self) -> PathBuf {
        self.root.join(BY_ALIAS_DIR)
    }

    fn config_dir(&self, short_hash: &str) -> PathBuf {
        self.by_hash_dir().join(short_hash).join(CONFIG_SUBDIR)
    }

    /// Materialize a descriptor: write its entries under the hash
    /// directory and link every alias at it. Returns the short hash.
    ///
    /// A pre-existing hash directory is an error, whether it comes from a
    /// duplicate catalog entry or a short-hash collision; neither is
    /// silently reused.
    pub fn realize(&self, descriptor: &ConfigDescriptor) -> Result<String> {
        let short_hash = descriptor.entries().short_hash();
        let hash_dir = self.by_hash_dir().join(&short_hash);
        if hash_dir.exists() {
            bail!(
                "hash directory '{}' already exists (duplicate or colliding config)",
                hash_dir.display()
            );
        }

        let config_dir = hash_dir.join(CONFIG_SUBDIR);
        fs::create_dir_all(&config_dir)
            .with_context(|| format!("creating '{}'", config_dir.display()))?;
        for (name, content) in descriptor.entries().iter() {
            validate_name(name, "entry name")?;
            let path = config_dir.join(name);
            fs::write(&path, content)
                .with_context(|| format!("writing entry '{}'", path.display()))?;
        }

        for alias in descriptor.aliases() {
            validate_name(alias, "alias")?;
            let link = self.by_alias_dir().join(alias);
            // Relative target keeps the store relocatable as a unit.
            let target = Path::new("..").join(BY_HASH_DIR).join(&short_hash);
            symlink(&target, &link)
                .with_context(|| format!("creating alias link '{}'", link.display()))?;
        }

        Ok(short_hash)
    }

    /// Resolve an alias to the short hash it points at.
    pub fn resolve_alias(&self, alias: &str) -> Result<String> {
        let link = self.by_alias_dir().join(alias);
        let target = fs::read_link(&link)
            .with_context(|| format!("reading alias link '{}'", link.display()))?;
        target
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .with_context(|| format!("alias '{alias}' points at malformed target '{}'", target.display()))
    }

    /// Read a realized config's entries back from disk.
    pub fn read_config(&self, short_hash: &str) -> Result<EntrySet> {
        let config_dir = self.config_dir(short_hash);
        let mut entries = EntrySet::new();
        for dir_entry in fs::read_dir(&config_dir)
            .with_context(|| format!("reading '{}'", config_dir.display()))?
        {
            let dir_entry = dir_entry?;
            let path = dir_entry.path();
            let name = dir_entry
                .file_name()
                .into_string()
                .ok()
                .with_context(|| format!("non-UTF-8 entry name in '{}'", config_dir.display()))?;
            let content = fs::read_to_string(&path)
                .with_context(|| format!("reading entry '{}'", path.display()))?;
            entries.insert(name, content);
        }
        Ok(entries)
    }

    /// Short hashes of every realized config, sorted.
    pub fn list_configs(&self) -> Result<Vec<String>> {
        let dir = self.by_hash_dir();
        let mut out = Vec::new();
        for dir_entry in
            fs::read_dir(&dir).with_context(|| format!("reading '{}'", dir.display()))?
        {
            let dir_entry = dir_entry?;
            if dir_entry.file_type()?.is_dir() {
                if let Ok(name) = dir_entry.file_name().into_string() {
                    out.push(name);
                }
            }
        }
        out.sort();
        Ok(out)
    }

    /// Basic store statistics.
    pub fn status(&self) -> Result<StoreStatus> {
        let mut entry_files = 0u64;
        let mut entry_bytes = 0u64;
        for walk_entry in WalkDir::new(self.by_hash_dir())
            .into_iter()
            .filter_map(Result::ok)
        {
            if walk_entry.file_type().is_file() {
                entry_files += 1;
                entry_bytes += walk_entry.metadata().map(|md| md.len()).unwrap_or(0);
            }
        }

        let mut aliases = 0u64;
        let alias_dir = self.by_alias_dir();
        if alias_dir.is_dir() {
            for dir_entry in fs::read_dir(&alias_dir)
                .with_context(|| format!("reading '{}'", alias_dir.display()))?
            {
                let _ = dir_entry?;
                aliases += 1;
            }
        }

        Ok(StoreStatus {
            root: self.root.clone(),
            configs: self.list_configs()?.len() as u64,
            aliases,
            entry_files,
            entry_bytes,
        })
    }
}

/// Basic store statistics.
#[derive(Debug, Clone)]
pub struct StoreStatus {
    pub root: PathBuf,
    pub configs: u64,
    pub aliases: u64,
    pub entry_files: u64,
    pub entry_bytes: u64,
}

fn validate_name(name: &str, what: &str) -> Result<()> {
    if name.is_empty() {
        bail!("{what} must not be empty");
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        bail!("{what} must be a safe filename segment: {name}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn descriptor(aliases: &[&str]) -> ConfigDescriptor {
        let mut entries = EntrySet::new();
        entries.insert("misc.json", "{\"requires_kernel_loader\": true}");
        entries.insert("seL4.settings.cmake", "set(KernelPlatform pc99 CACHE STRING \"\")\n");
        ConfigDescriptor::new(entries, aliases.iter().copied())
    }

    #[test]
    fn realize_writes_entries_and_aliases() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("configs");
        let store = ConfigStore::create(&root).unwrap();

        let desc = descriptor(&["pc99", "pc99-default"]);
        let short = store.realize(&desc).unwrap();
        assert_eq!(short, desc.entries().short_hash());

        // Entry files hold the exact content.
        let read_back = store.read_config(&short).unwrap();
        assert_eq!(&read_back, desc.entries());

        // Both aliases resolve to the same hash dir, and reading through
        // the symlink sees the same bytes.
        for alias in ["pc99", "pc99-default"] {
            assert_eq!(store.resolve_alias(alias).unwrap(), short);
            let via_link = root.join(BY_ALIAS_DIR).join(alias).join(CONFIG_SUBDIR);
            let misc = fs::read_to_string(via_link.join("misc.json")).unwrap();
            assert_eq!(misc, desc.entries().get("misc.json").unwrap());
        }
    }

    #[test]
    fn alias_links_are_relative() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("configs");
        let store = ConfigStore::create(&root).unwrap();
        let short = store.realize(&descriptor(&["pc99"])).unwrap();

        let target = fs::read_link(root.join(BY_ALIAS_DIR).join("pc99")).unwrap();
        assert!(target.is_relative());
        assert_eq!(target, Path::new("..").join(BY_HASH_DIR).join(&short));

        // Relocating the whole store keeps the alias valid.
        let moved = tmp.path().join("moved");
        fs::rename(&root, &moved).unwrap();
        let via_link = moved.join(BY_ALIAS_DIR).join("pc99").join(CONFIG_SUBDIR);
        assert!(via_link.join("misc.json").exists());
    }

    #[test]
    fn create_rejects_populated_root() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("configs");
        ConfigStore::create(&root).unwrap();
        assert!(ConfigStore::create(&root).is_err());

        // A root with only by-hash also counts as populated.
        let other = tmp.path().join("other");
        fs::create_dir_all(other.join(BY_HASH_DIR)).unwrap();
        assert!(ConfigStore::create(&other).is_err());
    }

    #[test]
    fn realizing_identical_content_twice_fails() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::create(&tmp.path().join("configs")).unwrap();
        store.realize(&descriptor(&["a"])).unwrap();
        let err = store.realize(&descriptor(&["b"])).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn unsafe_names_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::create(&tmp.path().join("configs")).unwrap();

        let mut entries = EntrySet::new();
        entries.insert("misc.json", "{}");
        let desc = ConfigDescriptor::new(entries, ["../escape"]);
        assert!(store.realize(&desc).is_err());
    }

    #[test]
    fn status_counts_configs_and_aliases() {
        let tmp = TempDir::new().unwrap();
        let store = ConfigStore::create(&tmp.path().join("configs")).unwrap();
        store.realize(&descriptor(&["pc99", "pc99-default"])).unwrap();

        let status = store.status().unwrap();
        assert_eq!(status.configs, 1);
        assert_eq!(status.aliases, 2);
        assert_eq!(status.entry_files, 2);
        assert!(status.entry_bytes > 0);
    }
}
