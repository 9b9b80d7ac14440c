//! The fixed catalog of board configurations and the one-shot
//! generation pass that realizes them.

use std::path::Path;

use anyhow::Result;

use crate::config::ConfigDescriptor;
use crate::generator::{Pc99Params, QemuArmVirtParams, Variant};
use crate::store::ConfigStore;

/// The configurations realized by one generation pass, in order.
///
/// Realization order never affects correctness; no entry depends on
/// another.
pub fn catalog() -> Result<Vec<ConfigDescriptor>> {
    Ok(vec![
        ConfigDescriptor::new(
            Variant::QemuArmVirt(QemuArmVirtParams {
                hypervisor: true,
                ..Default::default()
            })
            .generate()?,
            ["qemu-arm-virt"],
        ),
        ConfigDescriptor::new(
            Variant::QemuArmVirt(QemuArmVirtParams {
                hypervisor: true,
                mcs: true,
                ..Default::default()
            })
            .generate()?,
            ["qemu-arm-virt-with-mcs"],
        ),
        ConfigDescriptor::new(
            Variant::Pc99(Pc99Params::default()).generate()?,
            ["pc99"],
        ),
        ConfigDescriptor::new(
            Variant::Pc99(Pc99Params {
                mcs: true,
                ..Default::default()
            })
            .generate()?,
            ["pc99-with-mcs"],
        ),
    ])
}

/// Run a full generation pass into a fresh output root.
pub fn generate_configs(out_dir: &Path) -> Result<()> {
    let store = ConfigStore::create(out_dir)?;
    for descriptor in catalog()? {
        store.realize(&descriptor)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::MISC_ENTRY;
    use tempfile::TempDir;

    #[test]
    fn catalog_aliases_are_fixed() {
        let aliases: Vec<String> = catalog()
            .unwrap()
            .iter()
            .flat_map(|d| d.aliases().to_vec())
            .collect();
        assert_eq!(
            aliases,
            [
                "qemu-arm-virt",
                "qemu-arm-virt-with-mcs",
                "pc99",
                "pc99-with-mcs"
            ]
        );
    }

    #[test]
    fn generation_pass_realizes_every_entry() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("configs");
        generate_configs(&root).unwrap();

        let store = ConfigStore::open(&root).unwrap();
        assert_eq!(store.list_configs().unwrap().len(), 4);

        for descriptor in catalog().unwrap() {
            let alias = &descriptor.aliases()[0];
            let short = store.resolve_alias(alias).unwrap();
            let read_back = store.read_config(&short).unwrap();
            assert_eq!(&read_back, descriptor.entries());
        }
    }

    #[test]
    fn two_passes_produce_identical_hashes() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("first");
        let second = tmp.path().join("second");
        generate_configs(&first).unwrap();
        generate_configs(&second).unwrap();

        let a = ConfigStore::open(&first).unwrap().list_configs().unwrap();
        let b = ConfigStore::open(&second).unwrap().list_configs().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn generation_into_populated_root_fails() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("configs");
        generate_configs(&root).unwrap();
        assert!(generate_configs(&root).is_err());
    }

    #[test]
    fn pc99_alias_resolves_to_i386_kernel_config() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("configs");
        generate_configs(&root).unwrap();

        let store = ConfigStore::open(&root).unwrap();
        let short = store.resolve_alias("pc99").unwrap();
        let entries = store.read_config(&short).unwrap();
        let misc: serde_json::Value =
            serde_json::from_str(entries.get(MISC_ENTRY).unwrap()).unwrap();
        assert_eq!(misc["requires_kernel_loader"], false);
        assert_eq!(misc["requires_i386_kernel"], true);
    }
}
