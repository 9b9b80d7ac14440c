//! QEMU launch-command modelling for simulatable board variants.
//!
//! Variants that can run under QEMU ship a `simulate.sh` artifact: a
//! single `exec` line invoking the emulator with a fixed argument list,
//! forwarding any arguments given to the script itself.

/// An emulator invocation: program plus ordered argument list.
#[derive(Debug, Clone)]
pub struct QemuCommand {
    program: String,
    args: Vec<String>,
}

impl QemuCommand {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Words of the command line, program first.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str))
    }

    /// Render the `simulate.sh` body: one `exec` line with backslash
    /// continuations, terminated by `"$@"` so callers can append flags.
    pub fn to_script(&self) -> String {
        let words: Vec<&str> = self.words().chain(["\"$@\""]).collect();
        format!("exec {}\n", words.join(" \\\n    "))
    }
}

/// Ordered accumulator of QEMU CPU feature toggles.
///
/// Renders as `+feature`/`-feature` joined with trailing commas, ready to
/// sit between the CPU model and the enforcement-mode suffix. The toggle
/// order is contractual: downstream emulator behavior must not drift
/// across regenerations.
#[derive(Debug, Clone, Default)]
pub struct CpuFeatures {
    toggles: Vec<String>,
}

impl CpuFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(mut self, feature: &str) -> Self {
        self.toggles.push(format!("+{feature}"));
        self
    }

    pub fn disable(mut self, feature: &str) -> Self {
        self.toggles.push(format!("-{feature}"));
        self
    }

    pub fn render(&self) -> String {
        self.toggles
            .iter()
            .map(|toggle| format!("{toggle},"))
            .collect()
    }
}
