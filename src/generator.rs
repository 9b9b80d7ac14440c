//! Layered generation of board-variant configurations.
//!
//! A configuration is assembled from three layers, composed in a fixed
//! order: a base layer of universal kernel settings and flag defaults, an
//! architecture-family layer fixing toolchain and target metadata, and a
//! board-variant layer appending platform-specific settings and the
//! optional emulator command. Variants form a closed set, so dispatch is
//! a plain `match` on [`Variant`] rather than anything polymorphic.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::config::EntrySet;
use crate::qemu::{CpuFeatures, QemuCommand};
use crate::settings::KernelSettings;

/// Entry name for the cmake kernel settings artifact.
pub const KERNEL_SETTINGS_ENTRY: &str = "seL4.settings.cmake";
/// Entry name for the kernel-loader configuration artifact.
pub const LOADER_CONFIG_ENTRY: &str = "kernel-loader.config.json";
/// Entry name for the platform metadata artifact.
pub const MISC_ENTRY: &str = "misc.json";
/// Entry name for the optional emulator launch script.
pub const SIMULATE_ENTRY: &str = "simulate.sh";

/// Platform metadata written to `misc.json`.
///
/// Field order is the artifact's field order; the external build step
/// reads `cross_compiler_prefix` and `requires_i386_kernel` to drive the
/// cross toolchain and the post-build objcopy conversion.
#[derive(Debug, Clone, Serialize)]
pub struct MiscMetadata {
    pub cross_compiler_prefix: String,
    pub sel4_minimal_target: String,
    pub bare_metal_target: String,
    pub requires_kernel_loader: bool,
    pub requires_i386_kernel: bool,
}

/// Architecture family. Fixes the toolchain prefix, target triples, and
/// the loader/i386 flags (the base defaults, overridden for x86_64).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    Aarch64,
    X86_64,
}

impl Arch {
    fn misc(self) -> MiscMetadata {
        // Base defaults: a kernel loader is required and no 32-bit kernel
        // image is needed. x86_64 boots via multiboot instead, so it
        // flips both.
        match self {
            Self::Aarch64 => MiscMetadata {
                cross_compiler_prefix: "aarch64-linux-gnu-".to_string(),
                sel4_minimal_target: "aarch64-sel4-minimal".to_string(),
                bare_metal_target: "aarch64-unknown-none".to_string(),
                requires_kernel_loader: true,
                requires_i386_kernel: false,
            },
            Self::X86_64 => MiscMetadata {
                cross_compiler_prefix: String::new(),
                sel4_minimal_target: "x86_64-sel4-minimal".to_string(),
                bare_metal_target: "x86_64-unknown-none".to_string(),
                requires_kernel_loader: false,
                requires_i386_kernel: true,
            },
        }
    }
}

/// Parameters for the QEMU ARM virt board.
#[derive(Debug, Clone)]
pub struct QemuArmVirtParams {
    pub num_cores: u32,
    pub mcs: bool,
    pub cpu: String,
    pub hypervisor: bool,
}

impl Default for QemuArmVirtParams {
    fn default() -> Self {
        Self {
            num_cores: 1,
            mcs: false,
            cpu: "cortex-a57".to_string(),
            hypervisor: false,
        }
    }
}

/// Parameters for the PC99 (x86_64) board.
#[derive(Debug, Clone)]
pub struct Pc99Params {
    pub num_cores: u32,
    pub mcs: bool,
}

impl Default for Pc99Params {
    fn default() -> Self {
        Self {
            num_cores: 1,
            mcs: false,
        }
    }
}

/// A board variant with its parameters. Constructed fresh per catalog
/// entry and consumed once by [`generate`](Self::generate).
#[derive(Debug, Clone)]
pub enum Variant {
    QemuArmVirt(QemuArmVirtParams),
    Pc99(Pc99Params),
}

impl Variant {
    pub fn arch(&self) -> Arch {
        match self {
            Self::QemuArmVirt(_) => Arch::Aarch64,
            Self::Pc99(_) => Arch::X86_64,
        }
    }

    /// Produce the complete entry set for this variant.
    pub fn generate(&self) -> Result<EntrySet> {
        let mut entries = EntrySet::new();
        entries.insert(KERNEL_SETTINGS_ENTRY, self.kernel_settings().render());
        entries.insert(
            LOADER_CONFIG_ENTRY,
            render_loader_config(&self.loader_config())?,
        );
        entries.insert(MISC_ENTRY, serde_json::to_string(&self.arch().misc())?);
        if let Some(cmd) = self.qemu_command() {
            entries.insert(SIMULATE_ENTRY, cmd.to_script());
        }
        Ok(entries)
    }

    /// Kernel settings in layered order: base contributions first, then
    /// the variant's platform lines. The line order is consumed verbatim
    /// by the external build and reviewed by humans, so it is fixed.
    fn kernel_settings(&self) -> KernelSettings {
        let mut settings = base_settings();
        match self {
            Self::QemuArmVirt(params) => {
                settings.set("ARM_CPU", params.cpu.as_str());
                settings.set("KernelArch", "arm");
                settings.set("KernelSel4Arch", "aarch64");
                settings.set("KernelPlatform", "qemu-arm-virt");
                settings.set("KernelMaxNumNodes", params.num_cores.to_string());
                settings.set("KernelIsMCS", params.mcs);
                settings.set("KernelArmHypervisorSupport", params.hypervisor);
            }
            Self::Pc99(params) => {
                settings.set("KernelArch", "x86");
                settings.set("KernelSel4Arch", "x86_64");
                settings.set("KernelPlatform", "pc99");
                settings.set("KernelMaxNumNodes", params.num_cores.to_string());
                settings.set("KernelIsMCS", params.mcs);
                settings.set("KernelFSGSBase", "msr");
                settings.set("KernelSupportPCID", false);
                settings.set("KernelIOMMU", false);
                settings.set("KernelFPU", "FXSAVE");
            }
        }
        settings
    }

    /// Loader configuration object. No variant sets any keys today, but
    /// the artifact stays part of the on-disk contract.
    fn loader_config(&self) -> BTreeMap<String, serde_json::Value> {
        BTreeMap::new()
    }

    /// Emulator invocation, when the variant is simulatable.
    fn qemu_command(&self) -> Option<QemuCommand> {
        match self {
            Self::QemuArmVirt(params) => Some(
                QemuCommand::new("qemu-system-aarch64")
                    .args(["-machine", "virt,virtualization=on"])
                    .args(["-cpu", &params.cpu])
                    .args(["-smp", &params.num_cores.to_string()])
                    .args(["-m", "1024"])
                    .arg("-nographic")
                    .args(["-serial", "mon:stdio"]),
            ),
            Self::Pc99(_) => {
                let features = CpuFeatures::new()
                    .disable("vme")
                    .enable("pdpe1gb")
                    .disable("xsave")
                    .disable("xsaveopt")
                    .disable("xsavec")
                    .disable("fsgsbase")
                    .disable("invpcid")
                    .enable("syscall")
                    .enable("lm");
                Some(
                    QemuCommand::new("qemu-system-x86_64")
                        .args(["-cpu", &format!("Nehalem,{}enforce", features.render())])
                        .args(["-m", "size=512M"])
                        .arg("-nographic")
                        .args(["-serial", "mon:stdio"]),
                )
            }
        }
    }
}

/// Universal settings every variant starts from.
fn base_settings() -> KernelSettings {
    let mut settings = KernelSettings::new();
    settings.set("KernelVerificationBuild", false);
    settings.set("KernelRootCNodeSizeBits", "14");
    settings
}

/// Render the loader config as sorted-key JSON with 4-space indentation.
fn render_loader_config(config: &BTreeMap<String, serde_json::Value>) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    config.serialize(&mut serializer)?;
    Ok(String::from_utf8(buf)?)
}
