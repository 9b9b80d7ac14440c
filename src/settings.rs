//! Kernel settings emission as cmake `set()` cache statements.
//!
//! The external kernel build consumes `seL4.settings.cmake` via
//! `cmake -C`, so formatting and line order are part of the contract.

use std::fmt;

/// A settings value. Closed set: only strings and booleans exist, so an
/// unsupported value type cannot reach emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValue {
    Str(String),
    Bool(bool),
}

impl SettingValue {
    fn cmake_type(&self) -> &'static str {
        match self {
            Self::Str(_) => "STRING",
            Self::Bool(_) => "BOOL",
        }
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
        }
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Ordered accumulator of kernel settings lines.
///
/// Layers contribute by calling [`set`](Self::set) in their documented
/// order; [`render`](Self::render) concatenates the lines as appended.
#[derive(Debug, Clone, Default)]
pub struct KernelSettings {
    lines: Vec<String>,
}

impl KernelSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one `set(KEY VALUE CACHE TYPE "")` line.
    pub fn set(&mut self, key: &str, value: impl Into<SettingValue>) {
        let value = value.into();
        self.lines
            .push(format!("set({key} {value} CACHE {} \"\")\n", value.cmake_type()));
    }

    /// Newline-joined settings text in contribution order.
    pub fn render(&self) -> String {
        self.lines.concat()
    }
}
