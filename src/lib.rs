//! Content-addressed build configuration generator for seL4 kernels.
//!
//! This crate generates a deterministic set of kernel build
//! configurations, one per board variant, and stores them in a
//! content-addressed directory tree:
//!
//! ```text
//! <root>/by-hash/<short-hash>/config/
//!     seL4.settings.cmake        newline-joined cmake set() statements
//!     kernel-loader.config.json  sorted-key, 4-space-indented JSON
//!     misc.json                  platform metadata (toolchain, flags)
//!     simulate.sh                optional QEMU launch script
//! <root>/by-alias/<name>   ->   ../by-hash/<short-hash>
//! ```
//!
//! Control flow is a single sequential pass: the [`catalog`] lists the
//! board variants, the [`generator`] layers each variant's settings into
//! an [`config::EntrySet`], the [`hash`] module keys it, and the
//! [`store`] materializes files and alias symlinks.
//!
//! The crate only produces configuration inputs. Compiling the kernel,
//! validating toolchains, and converting binary formats are downstream
//! consumers of the store, not part of this crate.

pub mod catalog;
pub mod config;
pub mod generator;
pub mod hash;
pub mod qemu;
pub mod settings;
pub mod store;

pub use catalog::{catalog, generate_configs};
pub use config::{ConfigDescriptor, EntrySet};
pub use generator::{Pc99Params, QemuArmVirtParams, Variant};
pub use store::{ConfigStore, StoreStatus};
