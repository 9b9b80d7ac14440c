use std::path::Path;

use anyhow::{bail, Result};
use sel4_config_builder::{catalog, ConfigStore};

fn usage() -> &'static str {
    "Usage:\n  sel4-config-builder generate <out-dir>\n  sel4-config-builder generate -o|--out-dir <out-dir>\n  sel4-config-builder status <root>"
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.as_slice() {
        [cmd, out_dir] if cmd == "generate" => generate(Path::new(out_dir)),
        [cmd, flag, out_dir] if cmd == "generate" && (flag == "-o" || flag == "--out-dir") => {
            generate(Path::new(out_dir))
        }
        [cmd, root] if cmd == "status" => status(Path::new(root)),
        _ => bail!(usage()),
    }
}

fn generate(out_dir: &Path) -> Result<()> {
    let store = ConfigStore::create(out_dir)?;
    let descriptors = catalog()?;
    for descriptor in &descriptors {
        let short_hash = store.realize(descriptor)?;
        println!("[config] {} -> {}", descriptor.aliases().join(", "), short_hash);
    }
    println!("generated {} configs into '{}'", descriptors.len(), out_dir.display());
    Ok(())
}

fn status(root: &Path) -> Result<()> {
    let store = ConfigStore::open(root)?;
    let status = store.status()?;
    println!("store:       {}", status.root.display());
    println!("configs:     {}", status.configs);
    println!("aliases:     {}", status.aliases);
    println!("entry files: {}", status.entry_files);
    println!("entry bytes: {}", status.entry_bytes);
    Ok(())
}
